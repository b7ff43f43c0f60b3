use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use crate::compare::DistanceMetric;
use crate::types::GeneComparisonResult;

/// Two genomes whose average per-gene divergence stays below this
/// percentage are reported as likely close kin (parent/child range).
pub const KINSHIP_DIVERGENCE_THRESHOLD: f64 = 45.0;

/// Per-gene aggregate over all of that gene's feature comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneSummary {
    pub gene: String,
    pub regions: usize,
    pub distance: u64,
    pub length: u64,
    pub divergence_percent: f64,
}

/// Full comparison report: per-gene summaries plus the overall verdict.
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub metric: DistanceMetric,
    pub genes: Vec<GeneSummary>,
    pub average_divergence_percent: f64,
    pub likely_related: bool,
    pub results: Vec<GeneComparisonResult>,
}

/// Aggregates raw per-region results into a gene-level report.
pub fn summarize(results: &[GeneComparisonResult], metric: DistanceMetric) -> ComparisonReport {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (usize, u64, u64)> = HashMap::new();

    for result in results {
        if !totals.contains_key(&result.gene) {
            order.push(result.gene.clone());
        }
        let entry = totals.entry(result.gene.clone()).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += result.distance;
        entry.2 += result.length as u64;
    }

    let genes: Vec<GeneSummary> = order
        .into_iter()
        .filter_map(|gene| {
            totals.remove(&gene).map(|(regions, distance, length)| {
                let divergence_percent = if length == 0 {
                    0.0
                } else {
                    100.0 * distance as f64 / length as f64
                };
                GeneSummary {
                    gene,
                    regions,
                    distance,
                    length,
                    divergence_percent,
                }
            })
        })
        .collect();

    let average_divergence_percent = if genes.is_empty() {
        0.0
    } else {
        genes.iter().map(|g| g.divergence_percent).sum::<f64>() / genes.len() as f64
    };

    ComparisonReport {
        metric,
        genes,
        average_divergence_percent,
        likely_related: average_divergence_percent <= KINSHIP_DIVERGENCE_THRESHOLD,
        results: results.to_vec(),
    }
}

/// Prints the styled gene-level summary to stdout.
pub fn print_summary(report: &ComparisonReport) {
    println!();
    println!(
        "{} ({:?} distance)",
        style("Genome comparison summary").bold().cyan(),
        report.metric
    );
    println!();

    for gene in &report.genes {
        println!(
            "  {:<12} {:>3} region(s)  distance {:>8}  divergence {}",
            style(&gene.gene).green().bold(),
            gene.regions,
            gene.distance,
            style(format!("{:.2}%", gene.divergence_percent)).yellow()
        );
    }

    println!();
    println!(
        "  Average divergence: {}",
        style(format!("{:.2}%", report.average_divergence_percent)).bold()
    );
    if report.likely_related {
        println!(
            "  {}",
            style("Verdict: samples fall within the close-kinship range").green()
        );
    } else {
        println!(
            "  {}",
            style("Verdict: samples diverge beyond the close-kinship range").red()
        );
    }
}

/// Writes the full report (summaries and raw per-region results) as pretty
/// JSON.
pub fn write_json(report: &ComparisonReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(gene: &str, start: u64, distance: u64, length: usize) -> GeneComparisonResult {
        GeneComparisonResult {
            chromosome: "chr1".to_string(),
            start,
            gene: gene.to_string(),
            distance,
            length,
        }
    }

    #[test]
    fn summarize_aggregates_per_gene() {
        let results = vec![
            result("BRCA1", 0, 2, 100),
            result("BRCA1", 200, 3, 100),
            result("TP53", 500, 10, 50),
        ];
        let report = summarize(&results, DistanceMetric::Levenshtein);
        assert_eq!(report.genes.len(), 2);
        assert_eq!(report.genes[0].gene, "BRCA1");
        assert_eq!(report.genes[0].regions, 2);
        assert_eq!(report.genes[0].distance, 5);
        assert_eq!(report.genes[0].length, 200);
        assert!((report.genes[0].divergence_percent - 2.5).abs() < 1e-9);
        assert_eq!(report.genes[1].gene, "TP53");
        assert!((report.genes[1].divergence_percent - 20.0).abs() < 1e-9);
        assert!((report.average_divergence_percent - 11.25).abs() < 1e-9);
        assert!(report.likely_related);
    }

    #[test]
    fn high_divergence_is_not_kinship() {
        let results = vec![result("BRCA1", 0, 60, 100)];
        let report = summarize(&results, DistanceMetric::Hamming);
        assert!(!report.likely_related);
    }

    #[test]
    fn empty_result_set_yields_empty_report() {
        let report = summarize(&[], DistanceMetric::Hamming);
        assert!(report.genes.is_empty());
        assert_eq!(report.average_divergence_percent, 0.0);
    }

    #[test]
    fn write_json_round_trips_structure() {
        let results = vec![result("BRCA1", 0, 1, 10)];
        let report = summarize(&results, DistanceMetric::Levenshtein);
        let file = tempfile::NamedTempFile::new().expect("temp file");
        write_json(&report, file.path()).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(parsed["metric"], "levenshtein");
        assert_eq!(parsed["genes"][0]["gene"], "BRCA1");
        assert_eq!(parsed["results"][0]["distance"], 1);
    }
}
