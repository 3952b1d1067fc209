#![doc = include_str!("../README.md")]

pub mod allele;
pub mod cli;
pub mod config;
pub mod diplotype;
pub mod gene;
pub mod input;
pub mod phenotype;
pub mod pipeline;
pub mod recommendation;
pub mod report;
pub mod smart_reader;

pub use allele::{MarkerRules, REFERENCE_ALLELE};
pub use config::{ConfigurationError, EngineConfig};
pub use diplotype::{Diplotype, GeneCall};
pub use gene::{Gene, GeneRegistry};
pub use input::{InputError, SampleBatch, SampleRow};
pub use phenotype::{DiplotypePhenotypeTable, PhenotypeLabel};
pub use pipeline::{AnalysisPipeline, AnalysisResult, BatchOutcome, GeneError, GeneFailure};
pub use recommendation::{Language, RecommendationComposer};
