use std::collections::HashMap;

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::compare::{DistanceMetric, RegionComparator};
use crate::error::GenomeError;
use crate::types::{GeneComparisonResult, GenomicRegion, RegionKey};

/// Distributes region comparisons across a two-level parallel scheme: one
/// unit of work per gene, one sub-unit per feature within that gene.
///
/// Both genomes must have been assembled against the identical region
/// definition set; the coordinator sorts and validates this before any
/// comparison runs. Results land in a concurrent map keyed by region
/// identity, so the final set is independent of task completion order.
pub struct ComparisonCoordinator {
    metric: DistanceMetric,
    intermediate_output: bool,
}

impl ComparisonCoordinator {
    pub fn new(metric: DistanceMetric, intermediate_output: bool) -> Self {
        Self {
            metric,
            intermediate_output,
        }
    }

    /// Compares the two genomes region by region and returns one result per
    /// pair, ordered by the canonical region key.
    pub fn compare(
        &self,
        mut first: Vec<GenomicRegion>,
        mut second: Vec<GenomicRegion>,
    ) -> Result<Vec<GeneComparisonResult>, GenomeError> {
        first.sort_by(|a, b| a.key().cmp(&b.key()));
        second.sort_by(|a, b| a.key().cmp(&b.key()));
        validate_alignment(&first, &second)?;

        let genes = group_by_gene(first, second);
        debug!(
            genes = genes.len(),
            metric = ?self.metric,
            "dispatching gene comparison tasks"
        );

        let comparator = RegionComparator::new(self.metric);
        let results: DashMap<RegionKey, GeneComparisonResult> = DashMap::new();

        // One parallel unit per gene, one nested unit per feature pair. A
        // gene's iteration only finishes once all of its feature tasks have,
        // and collecting per-gene outcomes into a Vec lets sibling genes run
        // to completion even when one of them fails.
        let outcomes: Vec<Result<(), GenomeError>> = genes
            .par_iter()
            .map(|(gene, pairs)| {
                pairs.par_iter().try_for_each(|(a, b)| {
                    let result = comparator.compare(a, b).map_err(|e| e.in_gene(gene))?;
                    if self.intermediate_output {
                        info!(
                            gene = result.gene.as_str(),
                            chromosome = result.chromosome.as_str(),
                            start = result.start,
                            distance = result.distance,
                            length = result.length,
                            "feature comparison complete"
                        );
                    }
                    results.insert(a.key(), result);
                    Ok(())
                })
            })
            .collect();

        for outcome in outcomes {
            outcome?;
        }

        let mut collected: Vec<(RegionKey, GeneComparisonResult)> = results.into_iter().collect();
        collected.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(collected.into_iter().map(|(_, result)| result).collect())
    }
}

/// Checks that the two sorted region lists describe the same region set.
fn validate_alignment(
    first: &[GenomicRegion],
    second: &[GenomicRegion],
) -> Result<(), GenomeError> {
    if first.len() != second.len() {
        return Err(GenomeError::RegionCountMismatch {
            first: first.len(),
            second: second.len(),
        });
    }
    for (a, b) in first.iter().zip(second) {
        if a.chromosome() != b.chromosome() || a.start() != b.start() || a.gene() != b.gene() {
            return Err(GenomeError::AlignmentMismatch {
                chromosome: a.chromosome().to_string(),
                start: a.start(),
                gene: a.gene().to_string(),
                reason: format!(
                    "paired against {}:{} ({}); mismatched BED definitions",
                    b.chromosome(),
                    b.start(),
                    b.gene()
                ),
            });
        }
    }
    Ok(())
}

/// Pairs up the validated lists and partitions the pairs by gene name,
/// preserving first-appearance order.
fn group_by_gene(
    first: Vec<GenomicRegion>,
    second: Vec<GenomicRegion>,
) -> Vec<(String, Vec<(GenomicRegion, GenomicRegion)>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<(GenomicRegion, GenomicRegion)>> = HashMap::new();

    for (a, b) in first.into_iter().zip(second) {
        let gene = a.gene().to_string();
        if !groups.contains_key(&gene) {
            order.push(gene.clone());
        }
        groups.entry(gene).or_default().push((a, b));
    }

    order
        .into_iter()
        .filter_map(|gene| groups.remove(&gene).map(|pairs| (gene, pairs)))
        .collect()
}
