use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::types::{complement_of, GeneComparisonResult, GenomicRegion};

/// The distance metric used to score a pair of regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Positional mismatch count; strand-complement aware.
    Hamming,
    /// Unit-cost edit distance (insertions, deletions, substitutions).
    #[default]
    Levenshtein,
}

/// Scores the divergence between two consensus regions assumed to describe
/// the same genomic interval in two individuals.
pub struct RegionComparator {
    metric: DistanceMetric,
}

impl RegionComparator {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    pub fn compare(
        &self,
        first: &GenomicRegion,
        second: &GenomicRegion,
    ) -> Result<GeneComparisonResult, GenomeError> {
        match self.metric {
            DistanceMetric::Hamming => self.hamming(first, second),
            DistanceMetric::Levenshtein => self.levenshtein(first, second),
        }
    }

    /// Counts positions where the two sequences disagree and are not
    /// Watson-Crick complements of each other. A base and its complement at
    /// the same position model the two strands of the same molecule, so they
    /// are not divergent. Requires equal-length sequences.
    pub fn hamming(
        &self,
        first: &GenomicRegion,
        second: &GenomicRegion,
    ) -> Result<GeneComparisonResult, GenomeError> {
        let f = first.sequence().as_bytes();
        let s = second.sequence().as_bytes();
        if f.len() != s.len() {
            return Err(GenomeError::AlignmentMismatch {
                chromosome: first.chromosome().to_string(),
                start: first.start(),
                gene: first.gene().to_string(),
                reason: format!(
                    "Hamming distance needs equal lengths, got {} and {}",
                    f.len(),
                    s.len()
                ),
            });
        }

        let distance = f
            .iter()
            .zip(s)
            .filter(|&(&a, &b)| a != b && Some(a) != complement_of(b))
            .count() as u64;

        Ok(GeneComparisonResult {
            chromosome: first.chromosome().to_string(),
            start: first.start(),
            gene: first.gene().to_string(),
            distance,
            length: f.len(),
        })
    }

    /// Unit-cost edit distance computed with two rolling rows, so working
    /// memory stays at O(min(N, M)) instead of a full N x M matrix.
    pub fn levenshtein(
        &self,
        first: &GenomicRegion,
        second: &GenomicRegion,
    ) -> Result<GeneComparisonResult, GenomeError> {
        let f = first.sequence().as_bytes();
        let s = second.sequence().as_bytes();

        Ok(GeneComparisonResult {
            chromosome: first.chromosome().to_string(),
            start: first.start(),
            gene: first.gene().to_string(),
            distance: edit_distance(f, s),
            length: f.len().max(s.len()),
        })
    }
}

/// Rolling-two-row Needleman-Wunsch/Levenshtein. Rows run along the shorter
/// input; the distance is symmetric so the swap is free.
fn edit_distance(first: &[u8], second: &[u8]) -> u64 {
    if second.len() > first.len() {
        return edit_distance(second, first);
    }

    let mut previous: Vec<u64> = (0..=second.len() as u64).collect();
    let mut current = vec![0u64; second.len() + 1];

    for l in 1..=first.len() {
        current[0] = l as u64;
        for k in 1..=second.len() {
            let substitution = previous[k - 1] + u64::from(first[l - 1] != second[k - 1]);
            current[k] = (current[k - 1] + 1)
                .min(previous[k] + 1)
                .min(substitution);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[second.len()]
}
