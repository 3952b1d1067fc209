//! Dosing recommendation text per gene and phenotype.
//!
//! Clinically significant phrases are wrapped in `<b>…</b>` for the report
//! renderer.

use serde::Serialize;

use crate::gene::Gene;
use crate::phenotype::PhenotypeLabel;

/// Language of recommendation text and phenotype names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

const EN_KEYWORDS: &[&str] = &[
    "reduce the dose",
    "dose reduction",
    "reduction of the starting dose",
    "avoid the use",
    "increased risk",
    "therapeutic alternative",
    "alternative drug",
    "alternative endocrine therapy",
    "therapeutic failure",
    "severe or fatal toxicity",
    "increased toxicity",
];

const ES_KEYWORDS: &[&str] = &[
    "reducir dosis",
    "reducción de la dosis",
    "evitar el uso",
    "riesgo aumentado",
    "alternativa terapéutica",
    "fármaco alternativo",
    "terapia endocrina alternativa",
    "fracaso terapéutico",
    "toxicidad grave o mortal",
    "toxicidad aumentada",
];

const EMPHASIS_OPEN: &str = "<b>";
const EMPHASIS_CLOSE: &str = "</b>";

/// Single-pass, longest-match-first keyword emphasis.
///
/// Text inside an emitted span is never scanned again, so a keyword nested
/// in a longer one is not wrapped twice.
#[derive(Debug, Clone)]
pub struct Emphasizer {
    patterns: Vec<String>,
}

impl Emphasizer {
    /// Each keyword is matched as written and with its first letter
    /// capitalized.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if keyword.is_empty() {
                continue;
            }
            for variant in [keyword.to_string(), capitalize(keyword)] {
                if !patterns.contains(&variant) {
                    patterns.push(variant);
                }
            }
        }
        patterns.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { patterns }
    }

    pub fn emphasize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut rest = text;
        while let Some(ch) = rest.chars().next() {
            match self.patterns.iter().find(|p| rest.starts_with(p.as_str())) {
                Some(pattern) => {
                    out.push_str(EMPHASIS_OPEN);
                    out.push_str(pattern);
                    out.push_str(EMPHASIS_CLOSE);
                    rest = &rest[pattern.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        out
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Maps a gene's phenotype to emphasized recommendation text.
#[derive(Debug, Clone)]
pub struct RecommendationComposer {
    language: Language,
    emphasizer: Emphasizer,
}

impl RecommendationComposer {
    pub fn new(language: Language) -> Self {
        let keywords = match language {
            Language::En => EN_KEYWORDS,
            Language::Es => ES_KEYWORDS,
        };
        Self {
            language,
            emphasizer: Emphasizer::new(keywords),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn recommend(&self, gene: Gene, phenotype: PhenotypeLabel) -> String {
        self.emphasizer.emphasize(template(self.language, gene, phenotype))
    }
}

impl Default for RecommendationComposer {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

/// Raw (un-emphasized) recommendation template.
pub fn template(language: Language, gene: Gene, phenotype: PhenotypeLabel) -> &'static str {
    use PhenotypeLabel::*;

    match language {
        Language::En => match (gene, phenotype) {
            (Gene::Dpyd, Normal) | (Gene::Ugt1a1, Normal) | (Gene::Cyp2d6, Normal | Ultrarapid) => {
                "Standard dose according to the product label."
            }
            (Gene::Dpyd, Intermediate) => {
                "Risk of increased toxicity. Consider a 50% dose reduction of the starting dose, followed by titration according to tolerance."
            }
            (Gene::Dpyd, Poor) => {
                "High risk of severe or fatal toxicity. Avoid the use of fluoropyrimidines. Consider an alternative drug."
            }
            (Gene::Cyp2d6, Intermediate) => {
                "Risk of reduced efficacy. Consider an alternative endocrine therapy (e.g. an aromatase inhibitor)."
            }
            (Gene::Cyp2d6, Poor) => {
                "High risk of therapeutic failure. Use of an alternative endocrine therapy (e.g. an aromatase inhibitor) is recommended."
            }
            (Gene::Ugt1a1, Intermediate) => {
                "Increased risk of neutropenia. Consider starting at the standard dose; monitor for haematological toxicity."
            }
            (Gene::Ugt1a1, Poor) => {
                "High risk of severe neutropenia. A reduction of the starting dose of at least 30% is recommended."
            }
            _ => "Indeterminate phenotype. No recommendations can be made.",
        },
        Language::Es => match (gene, phenotype) {
            (Gene::Dpyd, Normal) | (Gene::Ugt1a1, Normal) | (Gene::Cyp2d6, Normal | Ultrarapid) => {
                "Dosis estándar según ficha técnica."
            }
            (Gene::Dpyd, Intermediate) => {
                "Riesgo de toxicidad aumentada. Considerar una reducción de la dosis inicial del 50% seguida de titulación según tolerancia."
            }
            (Gene::Dpyd, Poor) => {
                "Alto riesgo de toxicidad grave o mortal. Evitar el uso de fluoropirimidinas. Considerar un fármaco alternativo."
            }
            (Gene::Cyp2d6, Intermediate) => {
                "Riesgo de menor eficacia. Considerar una terapia endocrina alternativa (ej. inhibidor de la aromatasa)."
            }
            (Gene::Cyp2d6, Poor) => {
                "Alto riesgo de fracaso terapéutico. Se recomienda el uso de una terapia endocrina alternativa (ej. inhibidor de la aromatasa)."
            }
            (Gene::Ugt1a1, Intermediate) => {
                "Riesgo aumentado de neutropenia. Considerar iniciar con la dosis estándar; vigilar toxicidad hematológica."
            }
            (Gene::Ugt1a1, Poor) => {
                "Alto riesgo de neutropenia grave. Se recomienda una reducción de la dosis inicial de al menos un 30%."
            }
            _ => "Fenotipo indeterminado. No se pueden realizar recomendaciones.",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emphasizes_exact_and_capitalized_keywords() {
        let composer = RecommendationComposer::new(Language::En);
        assert_eq!(
            composer.recommend(Gene::Dpyd, PhenotypeLabel::Poor),
            "High risk of <b>severe or fatal toxicity</b>. <b>Avoid the use</b> of fluoropyrimidines. Consider an <b>alternative drug</b>."
        );
        assert_eq!(
            composer.recommend(Gene::Ugt1a1, PhenotypeLabel::Intermediate),
            "<b>Increased risk</b> of neutropenia. Consider starting at the standard dose; monitor for haematological toxicity."
        );
    }

    #[test]
    fn spanish_templates_follow_the_same_emphasis() {
        let composer = RecommendationComposer::new(Language::Es);
        assert_eq!(
            composer.recommend(Gene::Dpyd, PhenotypeLabel::Intermediate),
            "Riesgo de <b>toxicidad aumentada</b>. Considerar una <b>reducción de la dosis</b> inicial del 50% seguida de titulación según tolerancia."
        );
    }

    #[test]
    fn indeterminate_cannot_recommend() {
        let composer = RecommendationComposer::default();
        for gene in Gene::ALL {
            assert_eq!(
                composer.recommend(gene, PhenotypeLabel::Indeterminate),
                "Indeterminate phenotype. No recommendations can be made."
            );
        }
        // Ultrarapid has no template outside CYP2D6.
        assert_eq!(
            composer.recommend(Gene::Dpyd, PhenotypeLabel::Ultrarapid),
            "Indeterminate phenotype. No recommendations can be made."
        );
    }

    #[test]
    fn cyp2d6_ultrarapid_shares_standard_dose() {
        assert_eq!(
            template(Language::En, Gene::Cyp2d6, PhenotypeLabel::Ultrarapid),
            template(Language::En, Gene::Cyp2d6, PhenotypeLabel::Normal)
        );
    }

    #[test]
    fn longest_keyword_wins_and_is_wrapped_once() {
        let emphasizer = Emphasizer::new(["dose", "dose reduction", "reduction"]);
        assert_eq!(
            emphasizer.emphasize("A dose reduction, then a dose."),
            "A <b>dose reduction</b>, then a <b>dose</b>."
        );
    }

    #[test]
    fn emphasized_markup_is_not_rescanned() {
        let emphasizer = Emphasizer::new(["b", "risk"]);
        assert_eq!(emphasizer.emphasize("risk b"), "<b>risk</b> <b>b</b>");
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let emphasizer = Emphasizer::new(["fracaso terapéutico"]);
        assert_eq!(
            emphasizer.emphasize("Él: fracaso terapéutico ñ"),
            "Él: <b>fracaso terapéutico</b> ñ"
        );
    }
}
