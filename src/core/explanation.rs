// src/core/explanation.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consensus sign of the pairwise correlations inside an aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationSign {
    Pos,
    Neg,
}

impl fmt::Display for CorrelationSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationSign::Pos => write!(f, "pos"),
            CorrelationSign::Neg => write!(f, "neg"),
        }
    }
}

/// One aspect's entry in the importance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectImportanceRow {
    pub aspect: String,
    /// Fitted coefficient rounded to 4 significant digits. NaN when the fit
    /// could not identify it.
    pub importance: f64,
    pub features: Vec<String>,
    /// Smallest absolute pairwise Spearman correlation between the features.
    pub min_cor: Option<f64>,
    pub sign: Option<CorrelationSign>,
}

/// Importance of every aspect for one observation, sorted by descending
/// absolute importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectImportance {
    pub label: String,
    pub rows: Vec<AspectImportanceRow>,
    /// Aspects whose OLS coefficient is undefined (rank deficient design).
    pub degenerate_aspects: Vec<String>,
    /// Reference column whose values equal the known outcome, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspected_outcome: Option<String>,
}

impl AspectImportance {
    pub fn get(&self, aspect: &str) -> Option<&AspectImportanceRow> {
        self.rows.iter().find(|r| r.aspect == aspect)
    }

    pub fn is_degenerate(&self) -> bool {
        !self.degenerate_aspects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
