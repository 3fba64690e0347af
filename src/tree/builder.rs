//! Prefix tree construction from a batch of completions

use thiserror::Error;
use tracing::{debug, trace};

use super::fingerprint::Fingerprint;
use super::node::{LeafStats, Node, NodeId, Token};
use super::{fold_post_order, stats, CompletionTree};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Sequence {sequence} contains the reserved root token")]
    ReservedToken { sequence: usize },

    #[error("Score {score} for sequence {index} is not a finite number")]
    InvalidScore { index: usize, score: f64 },
}

/// Mutable tree state while completions are being inserted.
///
/// Owns the node identity counter: the next identity is always the
/// number of nodes created so far.
pub(crate) struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeId::ROOT, Token::Root)],
        }
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    /// Walk `tokens` from the root, creating nodes on first visit, and
    /// mark the final node terminal. Returns the terminal node's id.
    pub(crate) fn insert(&mut self, tokens: &[Token], score: Option<f64>) -> NodeId {
        let mut current = NodeId::ROOT;
        self.nodes[current.index()].count += 1;

        for &token in tokens {
            let next = match self.nodes[current.index()].child_id(token) {
                Some(child) => child,
                None => {
                    let child = self.next_id();
                    self.nodes.push(Node::new(child, token));
                    self.nodes[current.index()].children.insert(token, child);
                    child
                }
            };
            self.nodes[next.index()].count += 1;
            current = next;
        }

        let end = &mut self.nodes[current.index()];
        end.terminal = true;
        // Last completion ending here wins
        if score.is_some() {
            end.score = score;
        }
        current
    }

    /// Run both post-order passes and freeze the tree
    pub(crate) fn finish(mut self, sequences: usize, has_scores: bool) -> CompletionTree {
        fold_post_order(&mut self.nodes, fingerprint_slot, Fingerprint::of);
        trace!(nodes = self.nodes.len(), "fingerprints computed");

        fold_post_order(&mut self.nodes, stats_slot, stats::leaf_stats);
        trace!(nodes = self.nodes.len(), "leaf statistics computed");

        debug!(
            sequences,
            nodes = self.nodes.len(),
            has_scores,
            "completion tree built"
        );

        CompletionTree {
            nodes: self.nodes,
            sequences,
            has_scores,
        }
    }
}

pub(crate) fn fingerprint_slot(node: &mut Node) -> &mut Option<Fingerprint> {
    &mut node.fingerprint
}

pub(crate) fn stats_slot(node: &mut Node) -> &mut Option<LeafStats> {
    &mut node.stats
}

impl CompletionTree {
    /// Build a tree from completions and optional per-completion scores.
    ///
    /// Scores pair with completions by position. A score list shorter than
    /// the completions leaves the remaining terminals unscored; extra
    /// scores are ignored. Scores are expected in `[0, 1]` but finite values
    /// outside it are stored as given; only NaN and infinities are rejected.
    /// `has_scores` is true whenever a list is given, even an empty one.
    pub fn build<T>(completions: &[Vec<T>], scores: Option<&[f64]>) -> Result<Self, TreeError>
    where
        T: Into<Token> + Copy,
    {
        let mut builder = TreeBuilder::new();

        for (index, completion) in completions.iter().enumerate() {
            let tokens: Vec<Token> = completion.iter().map(|&t| t.into()).collect();
            if tokens.contains(&Token::Root) {
                return Err(TreeError::ReservedToken { sequence: index });
            }

            let score = match scores.and_then(|s| s.get(index)) {
                Some(&score) if !score.is_finite() => {
                    return Err(TreeError::InvalidScore { index, score });
                }
                other => other.copied(),
            };

            builder.insert(&tokens, score);
        }

        Ok(builder.finish(completions.len(), scores.is_some()))
    }
}
