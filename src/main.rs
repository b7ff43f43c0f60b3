use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod assembly;
mod compare;
mod coordinator;
mod error;
mod parsers;
mod report;
mod types;

use assembly::ConsensusBuilder;
use compare::DistanceMetric;
use coordinator::ComparisonCoordinator;
use parsers::{bed::BedParser, sam::SamParser};
use types::{AlignedRead, GenomicRegion};

/// Multithreaded exome consensus assembly and two-sample genome comparison
#[derive(Parser, Debug)]
#[command(
    name = "exome-diff",
    version,
    about = "Assemble two consensus exomes from aligned reads and score their divergence",
    long_about = r#"
Reconstructs a consensus nucleotide sequence per exon for each of two
individuals from their aligned reads (SAM, optionally gzipped), then scores
the divergence between the two genomes per gene using a strand-complement
aware Hamming distance or a memory-optimized Levenshtein edit distance.
Comparison work is parallelized per gene and per exon.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// First individual's alignment file (SAM, .sam.gz supported)
    #[arg(short = '1', long, value_name = "FILE")]
    first: PathBuf,

    /// Second individual's alignment file (SAM, .sam.gz supported)
    #[arg(short = '2', long, value_name = "FILE")]
    second: PathBuf,

    /// Exon definitions (BED: chrom, start, end, gene)
    #[arg(short, long, value_name = "FILE")]
    bed: PathBuf,

    /// Distance metric for region comparison
    #[arg(short, long, value_enum, default_value = "levenshtein")]
    metric: DistanceMetric,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Log each per-feature result as it completes
    #[arg(short, long)]
    intermediate: bool,

    /// Write the full result set as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    init_thread_pool(cli.threads)?;

    info!("Starting exome comparison");
    info!("Using {} threads", rayon::current_num_threads());

    run(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("exome_diff={}", level))
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let exons = BedParser::new()
        .parse(&cli.bed)
        .with_context(|| format!("failed to parse BED file {}", cli.bed.display()))?;
    println!(
        "{} {} exon region(s)",
        style("Loaded").bold(),
        style(exons.len()).cyan()
    );

    let first_genome = assemble_sample(&cli.first, &exons, "first sample")?;
    let second_genome = assemble_sample(&cli.second, &exons, "second sample")?;

    let coordinator = ComparisonCoordinator::new(cli.metric, cli.intermediate);
    let results = coordinator
        .compare(first_genome, second_genome)
        .context("genome comparison failed")?;

    let report = report::summarize(&results, cli.metric);
    report::print_summary(&report);

    if let Some(path) = &cli.output {
        report::write_json(&report, path)?;
        println!(
            "{} {}",
            style("Report written to").bold(),
            style(path.display()).cyan()
        );
    }

    Ok(())
}

fn assemble_sample(
    path: &PathBuf,
    exons: &[types::FeatureRegion],
    label: &str,
) -> Result<Vec<GenomicRegion>> {
    let reads: Vec<AlignedRead> = SamParser::new()
        .parse(path)
        .with_context(|| format!("failed to parse alignment file {}", path.display()))?;
    info!("{label}: {} aligned reads", reads.len());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Assembling consensus for {label}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let genome = ConsensusBuilder::new()
        .build(&reads, exons)
        .with_context(|| format!("consensus assembly failed for {label}"))?;

    spinner.finish_with_message(format!("Assembled {} region(s) for {label}", genome.len()));
    Ok(genome)
}
