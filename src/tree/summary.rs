//! Whole-tree summary figures

use serde::Serialize;

use super::CompletionTree;

/// Headline numbers for one tree, as printed by `completion-tree summary`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSummary {
    pub sequences: usize,
    pub nodes: usize,
    /// Nodes where at least one completion ends
    pub terminals: usize,
    pub max_depth: usize,
    pub distinct_subtrees: usize,
    /// Fingerprints that occur at more than one node
    pub repeated_subtrees: usize,
    /// Mean completion score at the root, when scored
    pub root_score: Option<f64>,
}

impl CompletionTree {
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            sequences: self.num_sequences(),
            nodes: self.node_count(),
            terminals: self.nodes().filter(|n| n.is_terminal()).count(),
            max_depth: self.depth(),
            distinct_subtrees: self.canonical_nodes().len(),
            repeated_subtrees: self.repeated_subtrees().len(),
            root_score: self.aggregate_score_percentage(self.root()),
        }
    }
}
