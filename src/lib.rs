//! Shared-prefix trees for comparing and scoring sampled model completions.
//!
//! Build a [`CompletionTree`] from a batch of token sequences (and optional
//! per-sequence scores, normally in `[0, 1]`; only NaN and infinities are
//! rejected), then read nodes, structural fingerprints and aggregate scores
//! through its accessors:
//!
//! ```
//! use completion_tree::{CompletionTree, Token};
//!
//! let completions = vec![vec![1u32, 2, 3], vec![1, 2, 4], vec![1, 5]];
//! let scores = [1.0, 0.0, 1.0];
//! let tree = CompletionTree::build(&completions, Some(&scores[..])).unwrap();
//!
//! let one = &tree[tree.root().child_id(Token::Id(1)).unwrap()];
//! assert_eq!(one.count(), 3);
//! let two = &tree[one.child_id(Token::Id(2)).unwrap()];
//! assert_eq!(tree.aggregate_score_percentage(two), Some(0.5));
//! ```

pub mod batch;
pub mod config;
pub mod decode;
pub mod output;
pub mod tree;

pub use batch::{BatchError, CompletionBatch};
pub use config::{Config, ConfigError};
pub use decode::{display_token, NoDecoder, TokenDecoder, VocabDecoder};
pub use output::{render_to_string, render_tree, RenderOptions};
pub use tree::{
    CompletionTree, Fingerprint, LeafStats, Node, NodeId, RepeatedSubtree, Token, TreeError,
    TreeSummary,
};
