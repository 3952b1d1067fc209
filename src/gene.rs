//! The gene panel and the gene → marker registry.
//!
//! Marker columns are attributed to a gene once, when a batch header is read,
//! by looking for the gene symbol inside the cleaned marker name
//! (`DPYD_rs3918290`, `CYP2D6_10_rs1065852`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::recommendation::Language;

/// Genes covered by the interpretation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gene {
    #[serde(rename = "DPYD")]
    Dpyd,
    #[serde(rename = "CYP2D6")]
    Cyp2d6,
    #[serde(rename = "UGT1A1")]
    Ugt1a1,
}

/// How a gene's diplotype is turned into a phenotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Count reference alleles in the diplotype.
    DoseCount,
    /// Look the normalized diplotype up in the phenotype table.
    Lookup,
}

impl Gene {
    pub const ALL: [Gene; 3] = [Gene::Dpyd, Gene::Cyp2d6, Gene::Ugt1a1];

    pub fn symbol(&self) -> &'static str {
        match self {
            Gene::Dpyd => "DPYD",
            Gene::Cyp2d6 => "CYP2D6",
            Gene::Ugt1a1 => "UGT1A1",
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            Gene::Dpyd | Gene::Ugt1a1 => Classification::DoseCount,
            Gene::Cyp2d6 => Classification::Lookup,
        }
    }

    /// Whether the gene's special tokens go through priority consumption.
    pub fn has_special_tokens(&self) -> bool {
        matches!(self, Gene::Cyp2d6)
    }

    /// Drugs whose dosing the gene's recommendation applies to.
    pub fn drugs(&self, language: Language) -> &'static [&'static str] {
        match (language, self) {
            (Language::En, Gene::Dpyd) => &["Fluorouracil", "Capecitabine", "Tegafur"],
            (Language::En, Gene::Cyp2d6) => &["Tamoxifen"],
            (Language::En, Gene::Ugt1a1) => &["Irinotecan"],
            (Language::Es, Gene::Dpyd) => &["Fluorouracilo", "Capecitabina", "Tegafur"],
            (Language::Es, Gene::Cyp2d6) => &["Tamoxifeno"],
            (Language::Es, Gene::Ugt1a1) => &["Irinotecán"],
        }
    }

    /// CPIC guideline annotation for the gene/drug pair.
    pub fn guideline_url(&self) -> &'static str {
        match self {
            Gene::Dpyd => {
                "https://www.clinpgx.org/chemical/PA128406956/guidelineAnnotation/PA166122686"
            }
            Gene::Cyp2d6 => {
                "https://www.clinpgx.org/chemical/PA451581/guidelineAnnotation/PA166176068"
            }
            Gene::Ugt1a1 => {
                "https://www.clinpgx.org/chemical/PA450085/guidelineAnnotation/PA166104951"
            }
        }
    }

    /// Does a (cleaned) marker name belong to this gene?
    pub fn owns_marker(&self, marker: &str) -> bool {
        marker.contains(self.symbol())
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Fixed gene → marker membership, in marker-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneRegistry {
    markers: BTreeMap<Gene, Vec<String>>,
}

impl GeneRegistry {
    pub fn new(markers: BTreeMap<Gene, Vec<String>>) -> Self {
        Self { markers }
    }

    /// Attribute each marker of a batch header to the genes it names.
    pub fn from_marker_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut markers: BTreeMap<Gene, Vec<String>> =
            Gene::ALL.iter().map(|gene| (*gene, Vec::new())).collect();

        for name in names {
            let name = name.as_ref();
            for gene in Gene::ALL {
                if gene.owns_marker(name)
                    && let Some(list) = markers.get_mut(&gene)
                {
                    list.push(name.to_string());
                }
            }
        }

        for (gene, list) in &markers {
            tracing::debug!("{} markers attributed to {}", list.len(), gene);
        }

        Self { markers }
    }

    /// Markers of a gene; empty when the batch carries none.
    pub fn markers(&self, gene: Gene) -> &[String] {
        self.markers.get(&gene).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn genes(&self) -> impl Iterator<Item = Gene> + '_ {
        self.markers.keys().copied()
    }
}
