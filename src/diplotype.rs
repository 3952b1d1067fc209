//! Diplotype assembly from a gene's mapped allele calls.
//!
//! Reference calls never take part in assembly. For CYP2D6 the `*10*4`,
//! `*10` and `*4` calls are first resolved against each other through an
//! ordered list of priority rules over a token-count bag; everything else
//! goes straight into the remaining pool.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::allele::REFERENCE_ALLELE;
use crate::gene::Gene;

/// CYP2D6 calls subject to priority consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialToken {
    /// `*10*4`, the compound call.
    Compound,
    /// `*10`
    Ten,
    /// `*4`
    Four,
}

impl SpecialToken {
    pub fn code(&self) -> &'static str {
        match self {
            SpecialToken::Compound => "*10*4",
            SpecialToken::Ten => "*10",
            SpecialToken::Four => "*4",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "*10*4" => Some(SpecialToken::Compound),
            "*10" => Some(SpecialToken::Ten),
            "*4" => Some(SpecialToken::Four),
            _ => None,
        }
    }

    fn slot(&self) -> usize {
        match self {
            SpecialToken::Compound => 0,
            SpecialToken::Ten => 1,
            SpecialToken::Four => 2,
        }
    }
}

/// Consume one of each `consumes` token, emit `emits`.
struct PriorityRule {
    consumes: &'static [SpecialToken],
    emits: SpecialToken,
}

const PRIORITY_RULES: [PriorityRule; 2] = [
    PriorityRule {
        consumes: &[SpecialToken::Compound, SpecialToken::Ten, SpecialToken::Four],
        emits: SpecialToken::Four,
    },
    PriorityRule {
        consumes: &[SpecialToken::Compound, SpecialToken::Ten],
        emits: SpecialToken::Ten,
    },
];

/// Multiset of special tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialBag {
    counts: [usize; 3],
}

impl SpecialBag {
    pub fn insert(&mut self, token: SpecialToken) {
        self.counts[token.slot()] += 1;
    }

    pub fn count(&self, token: SpecialToken) -> usize {
        self.counts[token.slot()]
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&n| n == 0)
    }

    fn holds_all(&self, tokens: &[SpecialToken]) -> bool {
        tokens.iter().all(|t| self.count(*t) > 0)
    }

    fn take_all(&mut self, tokens: &[SpecialToken]) {
        for token in tokens {
            self.counts[token.slot()] -= 1;
        }
    }

    /// Apply the priority rules to fixpoint, in order, then drop lone `*10`s.
    /// Returns the emitted alleles.
    pub fn resolve(&mut self) -> Vec<SpecialToken> {
        let mut emitted = Vec::new();
        for rule in &PRIORITY_RULES {
            while self.holds_all(rule.consumes) {
                self.take_all(rule.consumes);
                emitted.push(rule.emits);
            }
        }
        self.counts[SpecialToken::Ten.slot()] = 0;
        emitted
    }
}

/// Two allele codes, kept in construction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diplotype {
    first: String,
    second: String,
}

impl Diplotype {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// Number of tokens equal to the reference allele (0, 1 or 2).
    pub fn reference_count(&self) -> usize {
        // Whole-token equality: `*13` and `*10` must not count as `*1`.
        [&self.first, &self.second]
            .iter()
            .filter(|token| token.as_str() == REFERENCE_ALLELE)
            .count()
    }

    /// Tokens sorted and re-joined, the key used for phenotype lookup.
    pub fn normalized(&self) -> String {
        normalize(&self.to_string())
    }
}

impl fmt::Display for Diplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Sort the `/`-separated tokens of a diplotype string and re-join them.
pub fn normalize(diplotype: &str) -> String {
    let mut tokens: Vec<&str> = diplotype.split('/').collect();
    tokens.sort_unstable();
    tokens.join("/")
}

/// Outcome of assembling one gene for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneCall {
    Resolved(Diplotype),
    /// The calls could not be reduced to exactly two alleles.
    Unresolved,
}

impl GeneCall {
    pub const UNRESOLVED: &'static str = "Unresolved";

    pub fn diplotype(&self) -> Option<&Diplotype> {
        match self {
            GeneCall::Resolved(diplotype) => Some(diplotype),
            GeneCall::Unresolved => None,
        }
    }
}

impl fmt::Display for GeneCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneCall::Resolved(diplotype) => diplotype.fmt(f),
            GeneCall::Unresolved => f.write_str(Self::UNRESOLVED),
        }
    }
}

impl Serialize for GeneCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Assemble a gene's diplotype from its markers' allele sets, concatenated
/// in marker-encounter order.
pub fn resolve<I, S>(gene: Gene, alleles: I) -> GeneCall
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ordinary: Vec<String> = Vec::new();
    let mut specials: Vec<SpecialToken> = Vec::new();
    let mut bag = SpecialBag::default();

    for allele in alleles {
        let allele = allele.as_ref();
        if allele == REFERENCE_ALLELE {
            continue;
        }
        match SpecialToken::parse(allele).filter(|_| gene.has_special_tokens()) {
            Some(token) => {
                bag.insert(token);
                specials.push(token);
            }
            None => ordinary.push(allele.to_string()),
        }
    }

    let before = bag;
    let resolved: Vec<&str> = bag.resolve().iter().map(SpecialToken::code).collect();

    // Unconsumed *4 / *10*4 calls stay visible, in encounter order.
    let mut consumed = [0usize; 3];
    for token in [SpecialToken::Compound, SpecialToken::Ten, SpecialToken::Four] {
        consumed[token.slot()] = before.count(token) - bag.count(token);
    }
    let mut remaining = ordinary;
    for token in specials {
        if consumed[token.slot()] > 0 {
            consumed[token.slot()] -= 1;
        } else {
            remaining.push(token.code().to_string());
        }
    }

    assemble(gene, &resolved, &remaining)
}

fn assemble(gene: Gene, resolved: &[&str], remaining: &[String]) -> GeneCall {
    let call = match (resolved, remaining) {
        ([], []) => Diplotype::new(REFERENCE_ALLELE, REFERENCE_ALLELE),
        ([], [only]) => Diplotype::new(REFERENCE_ALLELE, only.as_str()),
        ([], [first, second, rest @ ..]) => {
            if !rest.is_empty() {
                tracing::debug!(
                    "{}: dropping {} allele calls beyond the first two",
                    gene,
                    rest.len()
                );
            }
            Diplotype::new(first.as_str(), second.as_str())
        }
        ([one], [other]) => Diplotype::new(*one, other.as_str()),
        ([one], []) => Diplotype::new(REFERENCE_ALLELE, *one),
        ([first, second], rest) => {
            if !rest.is_empty() {
                tracing::debug!(
                    "{}: dropping {} remaining calls after two resolved alleles",
                    gene,
                    rest.len()
                );
            }
            Diplotype::new(*first, *second)
        }
        _ => {
            tracing::debug!(
                "{}: cannot assemble {} resolved and {} remaining calls",
                gene,
                resolved.len(),
                remaining.len()
            );
            return GeneCall::Unresolved;
        }
    };
    GeneCall::Resolved(call)
}
