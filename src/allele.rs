use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

/// Wild-type allele code; the default for anything the rules do not cover.
pub const REFERENCE_ALLELE: &str = "*1";

/// Per-marker nucleotide → allele code rules.
///
/// Loaded from a JSON object of the form
/// `{"DPYD_rs3918290": {"T": "*2A"}, ...}`. Missing markers and missing
/// nucleotides are legal and map to [`REFERENCE_ALLELE`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MarkerRules {
    rules: HashMap<String, HashMap<String, String>>,
}

impl MarkerRules {
    pub fn new(rules: HashMap<String, HashMap<String, String>>) -> Self {
        Self { rules }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Allele code for one nucleotide token of a marker.
    pub fn allele_for(&self, marker: &str, token: &str) -> &str {
        self.rules
            .get(marker)
            .and_then(|tokens| tokens.get(token))
            .map(String::as_str)
            .unwrap_or(REFERENCE_ALLELE)
    }

    /// Map a raw genotype cell (`"C/G"`) to one allele code per token.
    ///
    /// The result always has as many entries as the cell has `/`-separated
    /// tokens, so it is never empty.
    pub fn map_genotype(&self, marker: &str, genotype: &str) -> Vec<String> {
        genotype
            .split('/')
            .map(|token| self.allele_for(marker, token).to_string())
            .collect()
    }
}

/// Normalize a raw column header into a marker name (`*` is not kept).
pub fn clean_marker_name(raw: &str) -> String {
    raw.replace('*', "_")
}
