//! Sample batch loading.
//!
//! A batch is a `;`-separated table with one row per sample. The
//! `Sample/Assay` column carries the sample id; every other column is a
//! marker holding a raw genotype call such as `C/G`.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::allele::clean_marker_name;
use crate::smart_reader;

pub const SAMPLE_COLUMN: &str = "Sample/Assay";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("genotype table has no \"Sample/Assay\" column")]
    MissingSampleColumn,
}

/// One sample's raw calls, aligned with [`SampleBatch::markers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub id: String,
    /// `None` when the row is shorter than the header.
    pub cells: Vec<Option<String>>,
}

/// Raw genotype calls for a batch of samples.
#[derive(Debug, Clone, Default)]
pub struct SampleBatch {
    markers: Vec<String>,
    rows: Vec<SampleRow>,
    dropped_rows: usize,
    duplicate_samples: usize,
}

impl SampleBatch {
    pub fn new(markers: Vec<String>, rows: Vec<SampleRow>) -> Self {
        Self {
            markers,
            rows,
            dropped_rows: 0,
            duplicate_samples: 0,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let reader = smart_reader::open_input(path)?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let sample_idx = headers
            .iter()
            .position(|h| h.trim() == SAMPLE_COLUMN)
            .ok_or(InputError::MissingSampleColumn)?;

        let marker_columns: Vec<usize> = (0..headers.len()).filter(|&i| i != sample_idx).collect();
        let markers: Vec<String> = marker_columns
            .iter()
            .map(|&i| clean_marker_name(&headers[i]))
            .collect();

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        let mut dropped_rows = 0;
        let mut duplicate_samples = 0;

        for record in reader.records() {
            let record = record?;
            let id = record.get(sample_idx).unwrap_or_default();
            if id.is_empty() {
                dropped_rows += 1;
                continue;
            }
            if !seen.insert(id.to_string()) {
                tracing::warn!("Duplicate sample {}; keeping the first row", id);
                duplicate_samples += 1;
                continue;
            }
            let cells = marker_columns
                .iter()
                .map(|&i| record.get(i).map(str::to_string))
                .collect();
            rows.push(SampleRow {
                id: id.to_string(),
                cells,
            });
        }

        tracing::info!(
            "Loaded {} samples across {} marker columns",
            rows.len(),
            markers.len()
        );

        Ok(Self {
            markers,
            rows,
            dropped_rows,
            duplicate_samples,
        })
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows skipped for lacking a sample id.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn duplicate_samples(&self) -> usize {
        self.duplicate_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_markers_and_rows() {
        let data = "Sample/Assay;DPYD*2A_rs3918290;CYP2D6_rs3892097\nP1;C/T;G/A\nP2;C/C;G/G\n";
        let batch = SampleBatch::from_reader(data.as_bytes()).unwrap();

        assert_eq!(batch.markers(), &["DPYD_2A_rs3918290", "CYP2D6_rs3892097"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows()[0].id, "P1");
        assert_eq!(
            batch.rows()[0].cells,
            vec![Some("C/T".to_string()), Some("G/A".to_string())]
        );
    }

    #[test]
    fn sample_column_need_not_be_first() {
        let data = "DPYD_rs1;Sample/Assay\nC/G;007\n";
        let batch = SampleBatch::from_reader(data.as_bytes()).unwrap();
        assert_eq!(batch.markers(), &["DPYD_rs1"]);
        assert_eq!(batch.rows()[0].id, "007");
    }

    #[test]
    fn drops_blank_ids_and_duplicates() {
        let data = "Sample/Assay;DPYD_rs1\nP1;C/C\n;C/G\nP1;G/G\n";
        let batch = SampleBatch::from_reader(data.as_bytes()).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.rows()[0].cells, vec![Some("C/C".to_string())]);
        assert_eq!(batch.dropped_rows(), 1);
        assert_eq!(batch.duplicate_samples(), 1);
    }

    #[test]
    fn short_rows_leave_missing_cells() {
        let data = "Sample/Assay;DPYD_rs1;UGT1A1_rs2\nP1;C/C\n";
        let batch = SampleBatch::from_reader(data.as_bytes()).unwrap();
        assert_eq!(batch.rows()[0].cells, vec![Some("C/C".to_string()), None]);
    }

    #[test]
    fn missing_sample_column_is_rejected() {
        let data = "Patient;DPYD_rs1\nP1;C/C\n";
        let err = SampleBatch::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::MissingSampleColumn));
    }
}
