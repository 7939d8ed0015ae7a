//! Seam for the external compatibility analyzer
//!
//! Scoring two shared results against each other is a collaborator's
//! job; this crate only defines the call surface it is handed decoded
//! results through. No scoring logic lives here.

use serde::{Deserialize, Serialize};

use crate::model::SharedResult;

/// Per-category compatibility score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

/// What the analyzer hands back for a pair of results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityScore {
    /// Overall match, 0.0 - 100.0
    pub overall: f64,
    pub by_category: Vec<CategoryScore>,
}

/// External compatibility-scoring collaborator
pub trait CompatibilityAnalyzer {
    fn analyze(&self, mine: &SharedResult, theirs: &SharedResult) -> CompatibilityScore;
}
