//! # Exome Diff
//!
//! A toolkit for reconstructing per-individual consensus sequences over
//! exonic regions from aligned sequencing reads and quantifying the genetic
//! difference between two individuals' reconstructed genomes.
//!
//! ## Features
//!
//! - Per-position majority-vote consensus calling with median-quality
//!   tie-breaking
//! - Strand-complement-aware Hamming distance and memory-optimized
//!   Levenshtein edit distance
//! - Two-level parallel comparison (per gene, per feature) on a bounded
//!   worker pool
//! - Plain-text SAM and BED input, optionally gzip-compressed
//! - Gene-level divergence reporting with JSON export

pub mod assembly;
pub mod compare;
pub mod coordinator;
pub mod error;
pub mod parsers;
pub mod report;
pub mod types;

// Re-export key types
pub use assembly::ConsensusBuilder;
pub use compare::{DistanceMetric, RegionComparator};
pub use coordinator::ComparisonCoordinator;
pub use error::GenomeError;
pub use parsers::{bed::BedParser, sam::SamParser};
pub use types::{
    AlignedRead, FeatureRegion, GeneComparisonResult, GenomicRegion, Nucleotide, RegionKey,
};
