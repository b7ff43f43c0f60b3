use thiserror::Error;

/// Errors produced by genome assembly and comparison.
///
/// All of these stem from invalid input or internal inconsistency, never
/// from transient conditions, so none of them are retryable.
#[derive(Debug, Error)]
pub enum GenomeError {
    /// A value failed validation while constructing a domain type.
    #[error("invalid {field} in {operation}: {reason}")]
    Construction {
        operation: &'static str,
        field: &'static str,
        reason: String,
    },

    /// A build or compare call received an empty input collection.
    #[error("{operation}: {argument} is empty")]
    EmptyInput {
        operation: &'static str,
        argument: &'static str,
    },

    /// A read claims to span a position that lies beyond its own length.
    /// Indicates malformed alignment input and aborts the whole build.
    #[error(
        "position {position} maps past the end of a read starting at \
         {read_start} (read length {read_len})"
    )]
    PositionConsistency {
        position: u64,
        read_start: u64,
        read_len: usize,
    },

    /// The two genomes were not assembled against identical region
    /// definitions, or two paired regions cannot be compared.
    #[error("regions not aligned at {chromosome}:{start} ({gene}): {reason}")]
    AlignmentMismatch {
        chromosome: String,
        start: u64,
        gene: String,
        reason: String,
    },

    /// The two genomes contain a different number of regions, so no
    /// pairwise comparison is possible at all.
    #[error("genomes were assembled from different region sets: {first} vs {second} regions")]
    RegionCountMismatch { first: usize, second: usize },

    /// A per-feature comparison task failed; carries the gene it belonged to.
    #[error("comparison task for gene {gene} failed")]
    TaskFailure {
        gene: String,
        #[source]
        source: Box<GenomeError>,
    },
}

impl GenomeError {
    /// Wraps an error with the gene whose task produced it.
    pub fn in_gene(self, gene: &str) -> Self {
        GenomeError::TaskFailure {
            gene: gene.to_string(),
            source: Box::new(self),
        }
    }
}
