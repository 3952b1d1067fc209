//! Structured run report for downstream tool consumption.
//!
//! One JSON document per batch: tool version, inputs, statistics and, for
//! every sample and gene, the diplotype, phenotype and recommendation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::diplotype::GeneCall;
use crate::gene::Gene;
use crate::input::SampleBatch;
use crate::phenotype::PhenotypeLabel;
use crate::pipeline::{BatchOutcome, GeneFailure};
use crate::recommendation::{Language, RecommendationComposer};

/// Complete report of an interpretation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Tool version
    pub version: String,
    /// Timestamp of run (RFC 3339)
    pub timestamp: String,

    pub input: InputInfo,
    pub language: Language,
    pub statistics: Statistics,

    /// Sample id → gene → interpretation
    pub samples: BTreeMap<String, BTreeMap<Gene, GeneReport>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<GeneFailure>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InputInfo {
    pub genotypes: String,
    pub rules: String,
    pub phenotype_table: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub samples: usize,
    pub dropped_rows: usize,
    pub duplicate_samples: usize,
    pub gene_calls: usize,
    pub unresolved_calls: usize,
    pub indeterminate_phenotypes: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneReport {
    pub diplotype: GeneCall,
    pub phenotype: PhenotypeLabel,
    /// Phenotype in the report language
    pub phenotype_name: &'static str,
    pub recommendation: String,
    pub drugs: &'static [&'static str],
    pub guideline: &'static str,
}

impl RunReport {
    /// Write the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        std::fs::write(path, json)?;
        tracing::info!("Wrote run report to {}", path.display());

        Ok(())
    }
}

/// For `batch.csv`, `batch_csv_report.json` in the same directory.
pub fn default_report_path(genotypes: &Path) -> PathBuf {
    let stem = genotypes
        .file_name()
        .map(|name| name.to_string_lossy().replace('.', "_"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "pgx".to_string());
    genotypes.with_file_name(format!("{stem}_report.json"))
}

/// Collects run metadata, then renders a [`RunReport`] from a finished batch.
#[derive(Debug, Default)]
pub struct RunReportBuilder {
    pub genotypes_path: String,
    pub rules_path: String,
    pub phenotype_table_path: String,
}

impl RunReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(
        self,
        batch: &SampleBatch,
        outcome: &BatchOutcome,
        composer: &RecommendationComposer,
    ) -> RunReport {
        let now = time::OffsetDateTime::now_utc();
        let timestamp = now
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        let language = composer.language();
        let samples = outcome
            .results
            .iter()
            .map(|(id, result)| {
                let genes = result
                    .diplotypes
                    .iter()
                    .filter_map(|(gene, call)| {
                        let phenotype = *result.phenotypes.get(gene)?;
                        Some((
                            *gene,
                            GeneReport {
                                diplotype: call.clone(),
                                phenotype,
                                phenotype_name: phenotype.display_name(language),
                                recommendation: composer.recommend(*gene, phenotype),
                                drugs: gene.drugs(language),
                                guideline: gene.guideline_url(),
                            },
                        ))
                    })
                    .collect();
                (id.clone(), genes)
            })
            .collect();

        let summary = outcome.summary();
        RunReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            input: InputInfo {
                genotypes: self.genotypes_path,
                rules: self.rules_path,
                phenotype_table: self.phenotype_table_path,
            },
            language,
            statistics: Statistics {
                samples: summary.samples,
                dropped_rows: batch.dropped_rows(),
                duplicate_samples: batch.duplicate_samples(),
                gene_calls: summary.gene_calls,
                unresolved_calls: summary.unresolved_calls,
                indeterminate_phenotypes: summary.indeterminate_phenotypes,
                failures: summary.failures,
            },
            samples,
            failures: outcome.failures.clone(),
        }
    }
}
