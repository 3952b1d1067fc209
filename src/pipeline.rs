//! Batch orchestration: allele mapping → diplotype → phenotype, per sample.
//!
//! Samples are independent and are processed in parallel; every result is
//! keyed by its sample id.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::diplotype::{self, GeneCall};
use crate::gene::{Gene, GeneRegistry};
use crate::input::{SampleBatch, SampleRow};
use crate::phenotype::{self, PhenotypeLabel};
use crate::recommendation::RecommendationComposer;

/// Per-sample, per-gene fault. The gene is left out of that sample's result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneError {
    #[error("no {gene} markers in the batch")]
    NoMarkers { gene: Gene },
    #[error("no call for marker {marker}")]
    MissingCell { marker: String },
}

/// Diplotype and phenotype per gene for one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub diplotypes: BTreeMap<Gene, GeneCall>,
    pub phenotypes: BTreeMap<Gene, PhenotypeLabel>,
}

impl AnalysisResult {
    pub fn recommendations(&self, composer: &RecommendationComposer) -> BTreeMap<Gene, String> {
        self.phenotypes
            .iter()
            .map(|(gene, phenotype)| (*gene, composer.recommend(*gene, *phenotype)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneFailure {
    pub sample: String,
    pub gene: Gene,
    pub reason: String,
}

/// Counters over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub samples: usize,
    pub gene_calls: usize,
    pub unresolved_calls: usize,
    pub indeterminate_phenotypes: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: BTreeMap<String, AnalysisResult>,
    pub failures: Vec<GeneFailure>,
}

impl BatchOutcome {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            samples: self.results.len(),
            failures: self.failures.len(),
            ..BatchSummary::default()
        };
        for result in self.results.values() {
            summary.gene_calls += result.diplotypes.len();
            summary.unresolved_calls += result
                .diplotypes
                .values()
                .filter(|call| matches!(call, GeneCall::Unresolved))
                .count();
            summary.indeterminate_phenotypes += result
                .phenotypes
                .values()
                .filter(|label| **label == PhenotypeLabel::Indeterminate)
                .count();
        }
        summary
    }
}

/// Runs the resolution engine over sample batches with one fixed
/// configuration.
pub struct AnalysisPipeline {
    config: EngineConfig,
}

impl AnalysisPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve one gene from its markers' raw calls, in marker order.
    pub fn analyze_gene<'a, I>(
        &self,
        gene: Gene,
        calls: I,
    ) -> Result<(GeneCall, PhenotypeLabel), GeneError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut alleles = Vec::new();
        let mut markers = 0usize;
        for (marker, genotype) in calls {
            let genotype = genotype.ok_or_else(|| GeneError::MissingCell {
                marker: marker.to_string(),
            })?;
            alleles.extend(self.config.rules().map_genotype(marker, genotype));
            markers += 1;
        }
        if markers == 0 {
            return Err(GeneError::NoMarkers { gene });
        }

        let call = diplotype::resolve(gene, &alleles);
        let label = phenotype::classify(gene, &call, self.config.table());
        Ok((call, label))
    }

    /// Analyze a single sample given as marker → raw call.
    pub fn analyze_sample(
        &self,
        registry: &GeneRegistry,
        genotypes: &HashMap<String, String>,
    ) -> (AnalysisResult, Vec<(Gene, GeneError)>) {
        let mut result = AnalysisResult::default();
        let mut errors = Vec::new();
        for gene in registry.genes() {
            let calls = registry
                .markers(gene)
                .iter()
                .map(|marker| (marker.as_str(), genotypes.get(marker).map(String::as_str)));
            match self.analyze_gene(gene, calls) {
                Ok((call, label)) => {
                    result.diplotypes.insert(gene, call);
                    result.phenotypes.insert(gene, label);
                }
                Err(err) => errors.push((gene, err)),
            }
        }
        (result, errors)
    }

    /// Analyze every sample of a batch. Faults stay local to the sample and
    /// gene they occur in.
    pub fn run(&self, batch: &SampleBatch) -> BatchOutcome {
        let registry = GeneRegistry::from_marker_names(batch.markers());
        let columns: Vec<(Gene, Vec<usize>)> = registry
            .genes()
            .map(|gene| {
                let owned = registry.markers(gene);
                let indices = batch
                    .markers()
                    .iter()
                    .enumerate()
                    .filter(|(_, marker)| owned.contains(marker))
                    .map(|(i, _)| i)
                    .collect::<Vec<_>>();
                if indices.is_empty() {
                    tracing::warn!("No {} markers in the batch; {} will be skipped", gene, gene);
                }
                (gene, indices)
            })
            .collect();

        tracing::info!("Analyzing {} samples", batch.len());

        let analyzed: Vec<(String, AnalysisResult, Vec<GeneFailure>)> = batch
            .rows()
            .par_iter()
            .map(|row| {
                let (result, failures) = self.analyze_row(row, batch.markers(), &columns);
                (row.id.clone(), result, failures)
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        for (id, result, failures) in analyzed {
            outcome.failures.extend(failures);
            outcome.results.insert(id, result);
        }

        let summary = outcome.summary();
        tracing::info!(
            "Analyzed {} samples: {} gene calls, {} unresolved, {} failures",
            summary.samples,
            summary.gene_calls,
            summary.unresolved_calls,
            summary.failures
        );
        outcome
    }

    fn analyze_row(
        &self,
        row: &SampleRow,
        markers: &[String],
        columns: &[(Gene, Vec<usize>)],
    ) -> (AnalysisResult, Vec<GeneFailure>) {
        let mut result = AnalysisResult::default();
        let mut failures = Vec::new();

        for (gene, indices) in columns {
            let calls = indices.iter().map(|&i| {
                (
                    markers[i].as_str(),
                    row.cells.get(i).and_then(|cell| cell.as_deref()),
                )
            });
            match self.analyze_gene(*gene, calls) {
                Ok((call, label)) => {
                    tracing::debug!("{} {}: {} ({:?})", row.id, gene, call, label);
                    result.diplotypes.insert(*gene, call);
                    result.phenotypes.insert(*gene, label);
                }
                Err(err) => {
                    tracing::debug!("{} {}: {}", row.id, gene, err);
                    failures.push(GeneFailure {
                        sample: row.id.clone(),
                        gene: *gene,
                        reason: err.to_string(),
                    });
                }
            }
        }

        (result, failures)
    }
}
