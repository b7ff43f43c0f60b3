use tracing::debug;

use crate::error::GenomeError;
use crate::types::{AlignedRead, FeatureRegion, GenomicRegion, Nucleotide, GAP};

/// Assembles per-region consensus sequences from a pileup of aligned reads.
///
/// Every position of every target region is called independently by majority
/// vote over the reads covering it. Count ties are broken by the larger
/// median base quality, with candidates evaluated in the canonical A, C, G, T
/// order so the call is deterministic regardless of read order.
pub struct ConsensusBuilder;

impl ConsensusBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds one consensus `GenomicRegion` per input feature, in input
    /// order. Fails on empty inputs and on reads whose span is inconsistent
    /// with their length.
    pub fn build(
        &self,
        reads: &[AlignedRead],
        regions: &[FeatureRegion],
    ) -> Result<Vec<GenomicRegion>, GenomeError> {
        if reads.is_empty() {
            return Err(GenomeError::EmptyInput {
                operation: "ConsensusBuilder::build",
                argument: "reads",
            });
        }
        if regions.is_empty() {
            return Err(GenomeError::EmptyInput {
                operation: "ConsensusBuilder::build",
                argument: "regions",
            });
        }

        let mut assembled = Vec::with_capacity(regions.len());
        for region in regions {
            let mut sequence = String::with_capacity(region.len());
            let mut qualities = Vec::with_capacity(region.len());

            for position in region.start()..region.end() {
                let (base, quality) = call_position(reads, region.chromosome(), position)?;
                sequence.push(base);
                qualities.push(quality);
            }

            debug!(
                chromosome = region.chromosome(),
                start = region.start(),
                gene = region.gene(),
                length = sequence.len(),
                "assembled consensus region"
            );
            assembled.push(GenomicRegion::new(
                region.chromosome(),
                region.start(),
                &sequence,
                qualities,
                region.gene(),
            )?);
        }
        Ok(assembled)
    }
}

impl Default for ConsensusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Calls a single position from the pileup of reads covering it.
///
/// Returns `('*', 0)` when no read contributes a canonical base. Observed
/// characters outside {A,C,G,T} are ignored entirely: they neither tally nor
/// appear in the output.
fn call_position(
    reads: &[AlignedRead],
    chromosome: &str,
    position: u64,
) -> Result<(char, u8), GenomeError> {
    let mut tallies: [Vec<u8>; 4] = Default::default();

    for read in reads {
        if read.chromosome() != chromosome || !read.spans(position) {
            continue;
        }
        let offset = (position - read.start()) as usize;
        if offset >= read.len() {
            return Err(GenomeError::PositionConsistency {
                position,
                read_start: read.start(),
                read_len: read.len(),
            });
        }
        if let Some(base) = Nucleotide::from_char(read.base_at(offset) as char) {
            tallies[base as usize].push(read.quality_at(offset));
        }
    }

    let mut best_base = GAP;
    let mut best_quality = 0u8;
    let mut best_count = 0usize;
    for base in Nucleotide::ALL {
        let observations = &mut tallies[base as usize];
        if observations.is_empty() {
            continue;
        }
        // Median computed once per candidate; it doubles as the tie-breaker
        // and as the recorded quality of the winning call.
        let median = median_quality(observations);
        if observations.len() > best_count
            || (observations.len() == best_count && median > best_quality)
        {
            best_count = observations.len();
            best_quality = median;
            best_base = base.to_char();
        }
    }
    Ok((best_base, best_quality))
}

/// Median of a quality list: middle element for odd counts, truncating
/// average of the two central elements for even counts, 0 when empty.
fn median_quality(qualities: &mut [u8]) -> u8 {
    if qualities.is_empty() {
        return 0;
    }
    qualities.sort_unstable();
    let mid = qualities.len() / 2;
    if qualities.len() % 2 != 0 {
        qualities[mid]
    } else {
        ((u16::from(qualities[mid - 1]) + u16::from(qualities[mid])) / 2) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(chromosome: &str, start: u64, sequence: &str, quality: u8) -> AlignedRead {
        AlignedRead::new(chromosome, start, sequence, vec![quality; sequence.len()])
            .expect("valid read")
    }

    fn exon(chromosome: &str, start: u64, end: u64, gene: &str) -> FeatureRegion {
        FeatureRegion::new(chromosome, start, end, gene).expect("valid feature")
    }

    #[test]
    fn build_rejects_empty_inputs() {
        let builder = ConsensusBuilder::new();
        let reads = vec![read("chr1", 0, "ACGT", 30)];
        let regions = vec![exon("chr1", 0, 4, "BRCA1")];
        assert!(matches!(
            builder.build(&[], &regions),
            Err(GenomeError::EmptyInput {
                argument: "reads",
                ..
            })
        ));
        assert!(matches!(
            builder.build(&reads, &[]),
            Err(GenomeError::EmptyInput {
                argument: "regions",
                ..
            })
        ));
    }

    #[test]
    fn build_returns_one_region_per_feature_in_input_order() {
        let reads = vec![read("chr1", 0, "ACGTACGT", 30), read("chr2", 10, "TTTT", 30)];
        let regions = vec![
            exon("chr2", 10, 14, "TP53"),
            exon("chr1", 0, 8, "BRCA1"),
            exon("chr1", 2, 6, "BRCA2"),
        ];
        let genome = ConsensusBuilder::new().build(&reads, &regions).unwrap();
        assert_eq!(genome.len(), 3);
        assert_eq!(genome[0].gene(), "TP53");
        assert_eq!(genome[0].sequence(), "TTTT");
        assert_eq!(genome[1].gene(), "BRCA1");
        assert_eq!(genome[1].sequence(), "ACGTACGT");
        assert_eq!(genome[2].sequence(), "GTAC");
        for (region, feature) in genome.iter().zip(&regions) {
            assert_eq!(region.len(), feature.len());
            assert_eq!(region.qualities().len(), feature.len());
        }
    }

    #[test]
    fn majority_vote_picks_most_observed_base() {
        let reads = vec![
            read("chr1", 0, "A", 10),
            read("chr1", 0, "A", 20),
            read("chr1", 0, "C", 90),
        ];
        let genome = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 1, "G1")])
            .unwrap();
        assert_eq!(genome[0].sequence(), "A");
        assert_eq!(genome[0].qualities(), &[15]);
    }

    #[test]
    fn count_tie_broken_by_higher_median_quality() {
        // A: counts 3 with median 40, C: counts 3 with median 55.
        let reads = vec![
            read("chr1", 0, "A", 40),
            read("chr1", 0, "A", 35),
            read("chr1", 0, "A", 45),
            read("chr1", 0, "C", 55),
            read("chr1", 0, "C", 50),
            read("chr1", 0, "C", 60),
        ];
        let genome = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 1, "G1")])
            .unwrap();
        assert_eq!(genome[0].sequence(), "C");
        assert_eq!(genome[0].qualities(), &[55]);
    }

    #[test]
    fn tie_break_is_independent_of_read_order() {
        let mut reads = vec![
            read("chr1", 0, "C", 55),
            read("chr1", 0, "A", 40),
            read("chr1", 0, "C", 50),
            read("chr1", 0, "A", 45),
            read("chr1", 0, "C", 60),
            read("chr1", 0, "A", 35),
        ];
        let forward = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 1, "G1")])
            .unwrap();
        reads.reverse();
        let backward = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 1, "G1")])
            .unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn uncovered_position_is_called_gap_with_zero_quality() {
        let reads = vec![read("chr1", 0, "AC", 30)];
        let genome = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 4, "G1")])
            .unwrap();
        assert_eq!(genome[0].sequence(), "AC**");
        assert_eq!(genome[0].qualities(), &[30, 30, 0, 0]);
    }

    #[test]
    fn reads_from_other_chromosomes_do_not_tally() {
        let reads = vec![read("chr2", 0, "TTTT", 90), read("chr1", 0, "AAAA", 10)];
        let genome = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 4, "G1")])
            .unwrap();
        assert_eq!(genome[0].sequence(), "AAAA");
    }

    #[test]
    fn non_canonical_bases_are_ignored_not_called() {
        let reads = vec![
            AlignedRead::new("chr1", 0, "NN", vec![90, 90]).unwrap(),
            read("chr1", 0, "GT", 20),
        ];
        let genome = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 2, "G1")])
            .unwrap();
        assert_eq!(genome[0].sequence(), "GT");
        assert_eq!(genome[0].qualities(), &[20, 20]);
    }

    #[test]
    fn even_observation_count_uses_truncating_average_median() {
        let reads = vec![
            read("chr1", 0, "G", 10),
            read("chr1", 0, "G", 15),
            read("chr1", 0, "G", 20),
            read("chr1", 0, "G", 90),
        ];
        let genome = ConsensusBuilder::new()
            .build(&reads, &[exon("chr1", 0, 1, "G1")])
            .unwrap();
        // sorted [10, 15, 20, 90] -> (15 + 20) / 2 truncated
        assert_eq!(genome[0].qualities(), &[17]);
    }

    #[test]
    fn median_quality_edge_cases() {
        assert_eq!(median_quality(&mut []), 0);
        assert_eq!(median_quality(&mut [7]), 7);
        assert_eq!(median_quality(&mut [3, 8]), 5);
        assert_eq!(median_quality(&mut [250, 250]), 250);
    }
}
