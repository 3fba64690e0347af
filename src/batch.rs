//! Completion batches stored as JSON

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::tree::{CompletionTree, TreeError};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to read batch: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse batch: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// One batch of sampled completions.
///
/// ```json
/// { "completions": [[15, 22, 9], [15, null]], "scores": [1.0, 0.0] }
/// ```
///
/// `null` marks a token whose id was not recorded. `scores` may be
/// omitted, or shorter than `completions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionBatch {
    pub completions: Vec<Vec<Option<u32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
}

impl CompletionBatch {
    pub fn from_json(content: &str) -> Result<Self, BatchError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn build_tree(&self) -> Result<CompletionTree, BatchError> {
        Ok(CompletionTree::build(
            &self.completions,
            self.scores.as_deref(),
        )?)
    }
}
