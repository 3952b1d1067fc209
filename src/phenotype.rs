//! Metabolizer phenotype classification.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::Serialize;
use thiserror::Error;

use crate::diplotype::{Diplotype, GeneCall, normalize};
use crate::gene::{Classification, Gene};
use crate::recommendation::Language;

pub const DIPLOTYPE_COLUMN: &str = "CYP2D6 Diplotype";
pub const SUMMARY_COLUMN: &str = "Coded Diplotype/Phenotype Summary";

/// Canonical metabolizer categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PhenotypeLabel {
    Normal,
    Intermediate,
    Poor,
    Ultrarapid,
    Indeterminate,
}

impl PhenotypeLabel {
    /// Translate a descriptor stem ("Normal", "Poor", ...). Anything outside
    /// the vocabulary is indeterminate.
    pub fn from_descriptor(stem: &str) -> Self {
        match stem {
            "Normal" => PhenotypeLabel::Normal,
            "Intermediate" => PhenotypeLabel::Intermediate,
            "Poor" => PhenotypeLabel::Poor,
            "Ultrarapid" => PhenotypeLabel::Ultrarapid,
            _ => PhenotypeLabel::Indeterminate,
        }
    }

    pub fn display_name(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::En, PhenotypeLabel::Normal) => "Normal Metabolizer",
            (Language::En, PhenotypeLabel::Intermediate) => "Intermediate Metabolizer",
            (Language::En, PhenotypeLabel::Poor) => "Poor Metabolizer",
            (Language::En, PhenotypeLabel::Ultrarapid) => "Ultrarapid Metabolizer",
            (Language::En, PhenotypeLabel::Indeterminate) => "Indeterminate",
            (Language::Es, PhenotypeLabel::Normal) => "Metabolizador normal",
            (Language::Es, PhenotypeLabel::Intermediate) => "Metabolizador intermedio",
            (Language::Es, PhenotypeLabel::Poor) => "Metabolizador lento",
            (Language::Es, PhenotypeLabel::Ultrarapid) => "Metabolizador ultrarrápido",
            (Language::Es, PhenotypeLabel::Indeterminate) => "Indeterminado",
        }
    }
}

impl fmt::Display for PhenotypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name(Language::En))
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column {0:?}")]
    MissingColumn(&'static str),
}

/// Normalized diplotype → phenotype descriptor.
#[derive(Debug, Clone, Default)]
pub struct DiplotypePhenotypeTable {
    entries: HashMap<String, String>,
}

impl DiplotypePhenotypeTable {
    /// Build from ordered `(diplotype, descriptor)` rows. Keys are
    /// normalized; the first row for a normalized key wins.
    pub fn from_rows<I, D, P>(rows: I) -> Self
    where
        I: IntoIterator<Item = (D, P)>,
        D: AsRef<str>,
        P: Into<String>,
    {
        let mut entries = HashMap::new();
        for (diplotype, descriptor) in rows {
            entries
                .entry(normalize(diplotype.as_ref().trim()))
                .or_insert_with(|| descriptor.into());
        }
        Self { entries }
    }

    /// Read the `;`-separated phenotype table.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(TableError::MissingColumn(name))
        };
        let diplotype_idx = column(DIPLOTYPE_COLUMN)?;
        let summary_idx = column(SUMMARY_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let diplotype = record.get(diplotype_idx).unwrap_or_default().to_string();
            let summary = record.get(summary_idx).unwrap_or_default().to_string();
            rows.push((diplotype, summary));
        }

        let table = Self::from_rows(rows);
        tracing::info!("Loaded {} normalized diplotype entries", table.len());
        Ok(table)
    }

    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Phenotype for a diplotype; a miss is indeterminate.
    pub fn lookup(&self, diplotype: &Diplotype) -> PhenotypeLabel {
        match self.get(&diplotype.normalized()) {
            Some(descriptor) => PhenotypeLabel::from_descriptor(descriptor_stem(descriptor)),
            None => PhenotypeLabel::Indeterminate,
        }
    }
}

/// `"Normal Metabolizer;Activity Score 2.0"` → `"Normal"`.
fn descriptor_stem(descriptor: &str) -> &str {
    let head = descriptor.split(';').next().unwrap_or_default().trim();
    head.strip_suffix(" Metabolizer").unwrap_or(head).trim_end()
}

/// Dose-counting policy: two reference alleles are normal, one
/// intermediate, none poor.
pub fn classify_by_dose(diplotype: &Diplotype) -> PhenotypeLabel {
    match diplotype.reference_count() {
        2 => PhenotypeLabel::Normal,
        1 => PhenotypeLabel::Intermediate,
        _ => PhenotypeLabel::Poor,
    }
}

/// Classify a gene call with the gene's policy.
pub fn classify(gene: Gene, call: &GeneCall, table: &DiplotypePhenotypeTable) -> PhenotypeLabel {
    let Some(diplotype) = call.diplotype() else {
        return PhenotypeLabel::Indeterminate;
    };
    match gene.classification() {
        Classification::DoseCount => classify_by_dose(diplotype),
        Classification::Lookup => table.lookup(diplotype),
    }
}
