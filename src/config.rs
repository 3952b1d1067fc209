//! Once-loaded, read-only rule tables shared by every sample of a run.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::allele::MarkerRules;
use crate::phenotype::{DiplotypePhenotypeTable, TableError};
use crate::smart_reader;

/// A required table is missing or unreadable. Fatal for the whole batch.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("cannot open {kind} {}: {source}", .path.display())]
    Open {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid marker rules {}: {source}", .path.display())]
    Rules {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid phenotype table {}: {source}", .path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

/// Marker rules plus the diplotype → phenotype table.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    rules: MarkerRules,
    table: DiplotypePhenotypeTable,
}

impl EngineConfig {
    pub fn from_parts(rules: MarkerRules, table: DiplotypePhenotypeTable) -> Self {
        Self { rules, table }
    }

    /// Load both tables; either failing means no configuration at all.
    pub fn load<P, Q>(rules_path: P, table_path: Q) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let rules = load_rules(rules_path.as_ref())?;
        let table = load_table(table_path.as_ref())?;
        Ok(Self { rules, table })
    }

    pub fn rules(&self) -> &MarkerRules {
        &self.rules
    }

    pub fn table(&self) -> &DiplotypePhenotypeTable {
        &self.table
    }
}

fn load_rules(path: &Path) -> Result<MarkerRules, ConfigurationError> {
    let reader = smart_reader::open_input(path).map_err(|source| ConfigurationError::Open {
        kind: "marker rules",
        path: path.to_path_buf(),
        source,
    })?;
    let rules = MarkerRules::from_json_reader(reader).map_err(|source| {
        ConfigurationError::Rules {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!("Loaded allele rules for {} markers", rules.len());
    Ok(rules)
}

fn load_table(path: &Path) -> Result<DiplotypePhenotypeTable, ConfigurationError> {
    let reader = smart_reader::open_input(path).map_err(|source| ConfigurationError::Open {
        kind: "phenotype table",
        path: path.to_path_buf(),
        source,
    })?;
    let table = DiplotypePhenotypeTable::from_csv_reader(reader).map_err(|source| {
        ConfigurationError::Table {
            path: path.to_path_buf(),
            source,
        }
    })?;
    if table.is_empty() {
        tracing::warn!(
            "Phenotype table {} has no rows; every lookup gene will be indeterminate",
            path.display()
        );
    }
    Ok(table)
}
