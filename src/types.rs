use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Placeholder emitted for positions with no qualifying read coverage.
pub const GAP: char = '*';

/// Gene identifiers are plain alphanumeric tokens.
static GENE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));

/// One of the four canonical DNA bases.
///
/// `ALL` fixes the canonical iteration order (A, C, G, T) used whenever the
/// bases are enumerated, in particular for majority-vote tie evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
}

impl Nucleotide {
    /// Canonical base order for deterministic iteration.
    pub const ALL: [Nucleotide; 4] = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T];

    /// Parses a base character, case-insensitively. Anything outside the
    /// four-letter alphabet is `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Nucleotide::A),
            'C' => Some(Nucleotide::C),
            'G' => Some(Nucleotide::G),
            'T' => Some(Nucleotide::T),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
        }
    }

    /// Watson-Crick complement (A<->T, C<->G). Total over the enum.
    pub fn complement(self) -> Self {
        match self {
            Nucleotide::A => Nucleotide::T,
            Nucleotide::T => Nucleotide::A,
            Nucleotide::C => Nucleotide::G,
            Nucleotide::G => Nucleotide::C,
        }
    }
}

/// Complement of an ASCII base character, or `None` for characters without
/// one (`*` included).
pub fn complement_of(base: u8) -> Option<u8> {
    Nucleotide::from_char(base as char).map(|n| n.complement().to_char() as u8)
}

/// A single aligned sequencing read, consumed read-only by the assembler.
///
/// `start` and `end` are 0-based genomic coordinates; `end` is inclusive and
/// derived from the read length at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedRead {
    chromosome: String,
    start: u64,
    end: u64,
    sequence: String,
    qualities: Vec<u8>,
}

impl AlignedRead {
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        sequence: &str,
        qualities: Vec<u8>,
    ) -> Result<Self, GenomeError> {
        let chromosome = chromosome.into();
        if chromosome.is_empty() {
            return Err(GenomeError::Construction {
                operation: "AlignedRead::new",
                field: "chromosome",
                reason: "empty".to_string(),
            });
        }
        if sequence.is_empty() {
            return Err(GenomeError::Construction {
                operation: "AlignedRead::new",
                field: "sequence",
                reason: "empty".to_string(),
            });
        }
        if sequence.len() != qualities.len() {
            return Err(GenomeError::Construction {
                operation: "AlignedRead::new",
                field: "qualities",
                reason: format!(
                    "length {} does not match sequence length {}",
                    qualities.len(),
                    sequence.len()
                ),
            });
        }
        let end = start + sequence.len() as u64 - 1;
        Ok(Self {
            chromosome,
            start,
            end,
            sequence: sequence.to_ascii_uppercase(),
            qualities,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Inclusive end coordinate.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Whether this read covers the absolute position (inclusive span).
    pub fn spans(&self, position: u64) -> bool {
        position >= self.start && position <= self.end
    }

    pub fn base_at(&self, offset: usize) -> u8 {
        self.sequence.as_bytes()[offset]
    }

    pub fn quality_at(&self, offset: usize) -> u8 {
        self.qualities[offset]
    }
}

/// An exon interval from the region-definition input; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRegion {
    chromosome: String,
    start: u64,
    end: u64,
    gene: String,
}

impl FeatureRegion {
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        gene: impl Into<String>,
    ) -> Result<Self, GenomeError> {
        let chromosome = chromosome.into();
        let gene = gene.into();
        if chromosome.is_empty() {
            return Err(GenomeError::Construction {
                operation: "FeatureRegion::new",
                field: "chromosome",
                reason: "empty".to_string(),
            });
        }
        if start >= end {
            return Err(GenomeError::Construction {
                operation: "FeatureRegion::new",
                field: "end",
                reason: format!("interval [{start}, {end}) is empty"),
            });
        }
        if !GENE_NAME.is_match(&gene) {
            return Err(GenomeError::Construction {
                operation: "FeatureRegion::new",
                field: "gene",
                reason: format!("name {gene:?} is not alphanumeric"),
            });
        }
        Ok(Self {
            chromosome,
            start,
            end,
            gene,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end coordinate.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }
}

/// One assembled consensus region: immutable after construction.
///
/// Sequence characters are uppercase and restricted to `{A, C, G, T, *}`;
/// the quality vector is always the same length as the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomicRegion {
    chromosome: String,
    start: u64,
    sequence: String,
    qualities: Vec<u8>,
    gene: String,
}

impl GenomicRegion {
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        sequence: &str,
        qualities: Vec<u8>,
        gene: impl Into<String>,
    ) -> Result<Self, GenomeError> {
        let chromosome = chromosome.into();
        let gene = gene.into();
        if chromosome.is_empty() {
            return Err(GenomeError::Construction {
                operation: "GenomicRegion::new",
                field: "chromosome",
                reason: "empty".to_string(),
            });
        }
        if !GENE_NAME.is_match(&gene) {
            return Err(GenomeError::Construction {
                operation: "GenomicRegion::new",
                field: "gene",
                reason: format!("name {gene:?} is not alphanumeric"),
            });
        }
        if sequence.len() != qualities.len() {
            return Err(GenomeError::Construction {
                operation: "GenomicRegion::new",
                field: "qualities",
                reason: format!(
                    "length {} does not match sequence length {}",
                    qualities.len(),
                    sequence.len()
                ),
            });
        }
        if let Some(bad) = sequence
            .chars()
            .find(|&c| c != GAP && Nucleotide::from_char(c).is_none())
        {
            return Err(GenomeError::Construction {
                operation: "GenomicRegion::new",
                field: "sequence",
                reason: format!("character {bad:?} is outside the {{A,C,G,T,*}} alphabet"),
            });
        }
        Ok(Self {
            chromosome,
            start,
            sequence: sequence.to_ascii_uppercase(),
            qualities,
            gene,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn qualities(&self) -> &[u8] {
        &self.qualities
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Maps an absolute genomic coordinate to a 0-based offset within this
    /// region. Fails for coordinates outside `[start, start + len)`.
    pub fn normalize(&self, position: u64) -> Result<usize, GenomeError> {
        if position < self.start || position >= self.start + self.sequence.len() as u64 {
            return Err(GenomeError::Construction {
                operation: "GenomicRegion::normalize",
                field: "position",
                reason: format!(
                    "{position} outside [{}, {})",
                    self.start,
                    self.start + self.sequence.len() as u64
                ),
            });
        }
        Ok((position - self.start) as usize)
    }

    /// Called base and quality at an absolute genomic coordinate.
    pub fn nucleotide_at(&self, position: u64) -> Result<(char, u8), GenomeError> {
        let offset = self.normalize(position)?;
        Ok((
            self.sequence.as_bytes()[offset] as char,
            self.qualities[offset],
        ))
    }

    pub fn key(&self) -> RegionKey {
        RegionKey {
            chromosome: self.chromosome.clone(),
            start: self.start,
        }
    }
}

/// The outcome of comparing one pair of regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneComparisonResult {
    pub chromosome: String,
    pub start: u64,
    pub gene: String,
    /// Distance between the two sequences under the chosen metric.
    pub distance: u64,
    /// Normalizing length: the longer of the two compared sequences.
    pub length: usize,
}

/// Identity of a region within a genome, used to key concurrent result
/// insertion and to impose the canonical comparison order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionKey {
    pub chromosome: String,
    pub start: u64,
}

impl RegionKey {
    /// Rank used for ordering chromosomes. Numeric labels (with or without a
    /// `chr` prefix) sort by value; X, Y and M/MT take the ranks 23-25; any
    /// other label sorts after all of those, lexicographically.
    fn chromosome_rank(&self) -> (u64, String) {
        let label = self
            .chromosome
            .strip_prefix("chr")
            .or_else(|| self.chromosome.strip_prefix("CHR"))
            .unwrap_or(&self.chromosome);
        if let Ok(n) = label.parse::<u64>() {
            return (n, String::new());
        }
        match label.to_ascii_uppercase().as_str() {
            "X" => (23, String::new()),
            "Y" => (24, String::new()),
            "M" | "MT" => (25, String::new()),
            _ => (u64::MAX, label.to_string()),
        }
    }
}

impl Ord for RegionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chromosome_rank()
            .cmp(&other.chromosome_rank())
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.chromosome.cmp(&other.chromosome))
    }
}

impl PartialOrd for RegionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> GenomicRegion {
        GenomicRegion::new(
            "chr1",
            168_900,
            "AGCTAGCTAGCT",
            vec![25, 70, 50, 60, 90, 20, 30, 55, 51, 57, 54, 58],
            "klkjlk1",
        )
        .expect("valid region")
    }

    #[test]
    fn creation_from_valid_data() {
        let r = region();
        assert_eq!(r.len(), 12);
        assert_eq!(r.sequence(), "AGCTAGCTAGCT");
    }

    #[test]
    fn creation_stores_sequence_uppercase() {
        let r = GenomicRegion::new("chr1", 0, "agct", vec![1, 2, 3, 4], "BRCA1").unwrap();
        assert_eq!(r.sequence(), "AGCT");
    }

    #[test]
    fn creation_from_invalid_gene_fails() {
        let err = GenomicRegion::new("chr1", 168_900, "AGCT", vec![1, 2, 3, 4], "@---");
        assert!(matches!(
            err,
            Err(GenomeError::Construction { field: "gene", .. })
        ));
    }

    #[test]
    fn creation_from_invalid_qualities_fails() {
        let err = GenomicRegion::new("chr1", 168_900, "AGCTAGCTAGCT", vec![10, 34, 35], "klkjlk1");
        assert!(matches!(
            err,
            Err(GenomeError::Construction {
                field: "qualities",
                ..
            })
        ));
    }

    #[test]
    fn creation_from_invalid_alphabet_fails() {
        let err = GenomicRegion::new("chr1", 0, "AGCN", vec![1, 2, 3, 4], "BRCA1");
        assert!(matches!(
            err,
            Err(GenomeError::Construction {
                field: "sequence",
                ..
            })
        ));
    }

    #[test]
    fn normalize_valid_positions() {
        let r = region();
        assert_eq!(r.normalize(168_900).unwrap(), 0);
        assert_eq!(r.normalize(168_903).unwrap(), 3);
        assert_eq!(r.normalize(168_900 + 11).unwrap(), 11);
    }

    #[test]
    fn normalize_rejects_out_of_range() {
        let r = region();
        assert!(r.normalize(10_000_000).is_err());
        assert!(r.normalize(168_899).is_err());
        assert!(r.normalize(168_900 + 12).is_err());
    }

    #[test]
    fn nucleotide_at_absolute_position() {
        let r = region();
        let (base, quality) = r.nucleotide_at(168_903).unwrap();
        assert_eq!(base, 'T');
        assert_eq!(quality, 60);
    }

    #[test]
    fn nucleotide_at_invalid_position_fails() {
        assert!(region().nucleotide_at(10_000_000).is_err());
    }

    #[test]
    fn complement_is_an_involution() {
        for n in Nucleotide::ALL {
            assert_eq!(n.complement().complement(), n);
        }
        assert_eq!(complement_of(b'A'), Some(b'T'));
        assert_eq!(complement_of(b'G'), Some(b'C'));
        assert_eq!(complement_of(b'*'), None);
        assert_eq!(complement_of(b'N'), None);
    }

    #[test]
    fn aligned_read_span_is_inclusive() {
        let read = AlignedRead::new("chr1", 100, "ACGT", vec![30, 30, 30, 30]).unwrap();
        assert_eq!(read.end(), 103);
        assert!(read.spans(100));
        assert!(read.spans(103));
        assert!(!read.spans(104));
        assert!(!read.spans(99));
    }

    #[test]
    fn feature_region_rejects_empty_interval() {
        assert!(FeatureRegion::new("chr1", 10, 10, "BRCA1").is_err());
        assert!(FeatureRegion::new("chr1", 12, 10, "BRCA1").is_err());
    }

    #[test]
    fn region_keys_order_numeric_then_sex_then_unknown() {
        let key = |c: &str, s: u64| RegionKey {
            chromosome: c.to_string(),
            start: s,
        };
        assert!(key("chr1", 500) < key("chr2", 0));
        assert!(key("chr2", 0) < key("chr10", 0));
        assert!(key("chr22", 0) < key("chrX", 0));
        assert!(key("chrX", 0) < key("chrY", 0));
        assert!(key("chrY", 0) < key("chrM", 0));
        assert!(key("chrM", 0) < key("chrUn1", 0));
        assert!(key("chr1", 100) < key("chr1", 200));
    }
}
