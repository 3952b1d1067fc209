use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    AnalysisPipeline, BatchOutcome, EngineConfig, Language, RecommendationComposer, SampleBatch,
    report::{self, RunReportBuilder},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Interpret pharmacogenomic genotype panels", long_about = None)]
struct Cli {
    /// `;`-separated genotype table with a Sample/Assay column (optionally gzipped)
    #[arg(value_name = "GENOTYPES")]
    genotypes: PathBuf,

    /// JSON marker rules: {"<marker>": {"<nucleotide>": "<allele>"}}
    #[arg(long, value_name = "JSON")]
    rules: PathBuf,

    /// `;`-separated CYP2D6 diplotype → phenotype table
    #[arg(long, value_name = "CSV")]
    phenotype_table: PathBuf,

    /// Run report path (defaults to <GENOTYPES>_report.json next to the input)
    #[arg(long, value_name = "REPORT")]
    output: Option<PathBuf>,

    /// Language of phenotype names and recommendations
    #[arg(long, value_enum, default_value_t = Language::En)]
    language: Language,

    /// Worker threads for sample processing (defaults to one per core)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Logging verbosity (e.g. error, warn, info, debug)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Only print the summary line, not the per-sample calls
    #[arg(long)]
    quiet: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = EngineConfig::load(&cli.rules, &cli.phenotype_table)
        .context("failed to load interpretation tables")?;
    let batch = SampleBatch::from_path(&cli.genotypes)
        .with_context(|| format!("failed to read genotypes: {}", cli.genotypes.display()))?;

    let pipeline = AnalysisPipeline::new(config);
    let outcome = match cli.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("failed to build worker pool")?
            .install(|| pipeline.run(&batch)),
        None => pipeline.run(&batch),
    };

    let composer = RecommendationComposer::new(cli.language);
    print_summary(&batch, &outcome);
    if !cli.quiet {
        print_calls(&outcome, cli.language);
    }

    let builder = RunReportBuilder {
        genotypes_path: cli.genotypes.to_string_lossy().to_string(),
        rules_path: cli.rules.to_string_lossy().to_string(),
        phenotype_table_path: cli.phenotype_table.to_string_lossy().to_string(),
    };
    let report_path = cli
        .output
        .clone()
        .unwrap_or_else(|| report::default_report_path(&cli.genotypes));
    builder
        .build(&batch, &outcome, &composer)
        .write(&report_path)
        .with_context(|| format!("failed to write report: {}", report_path.display()))?;

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
    Ok(())
}

fn print_summary(batch: &SampleBatch, outcome: &BatchOutcome) {
    let summary = outcome.summary();
    println!(
        "Interpreted {samples} samples; {calls} gene calls ({unresolved} unresolved, {indeterminate} indeterminate phenotypes).",
        samples = summary.samples,
        calls = summary.gene_calls,
        unresolved = summary.unresolved_calls,
        indeterminate = summary.indeterminate_phenotypes,
    );

    if batch.dropped_rows() > 0 || batch.duplicate_samples() > 0 {
        println!(
            "Skipped {dropped} rows without a sample id and {duplicates} duplicate samples.",
            dropped = batch.dropped_rows(),
            duplicates = batch.duplicate_samples()
        );
    }

    if summary.failures > 0 {
        println!(
            "Could not interpret {count} sample/gene pairs (see report).",
            count = summary.failures
        );
    }
}

fn print_calls(outcome: &BatchOutcome, language: Language) {
    for (sample, result) in &outcome.results {
        for (gene, call) in &result.diplotypes {
            let phenotype = result
                .phenotypes
                .get(gene)
                .map(|label| label.display_name(language))
                .unwrap_or_default();
            println!("{sample}\t{gene}\t{call}\t{phenotype}");
        }
    }
}
