//! Tree vertices and the token keys that label them

use std::collections::BTreeMap;
use std::fmt;

use super::fingerprint::Fingerprint;

/// A token position in a completion.
///
/// Ordering is total: `Root < Id(_) < Unknown`, with ids compared
/// numerically. Sibling nodes are always visited in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// Reserved marker carried only by the root node
    Root,
    /// A vocabulary token id
    Id(u32),
    /// A token whose id was not recorded
    Unknown,
}

impl Token {
    /// The vocabulary id, if this is a real token
    pub fn id(self) -> Option<u32> {
        match self {
            Token::Id(id) => Some(id),
            Token::Root | Token::Unknown => None,
        }
    }
}

impl From<u32> for Token {
    fn from(id: u32) -> Self {
        Token::Id(id)
    }
}

impl From<Option<u32>> for Token {
    fn from(id: Option<u32>) -> Self {
        id.map_or(Token::Unknown, Token::Id)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Root => write!(f, "ROOT"),
            Token::Id(id) => write!(f, "{}", id),
            Token::Unknown => write!(f, "?"),
        }
    }
}

/// Identity of a node within its tree.
///
/// Assigned in creation order starting from the root at zero and never
/// reused. Also the node's index in the tree's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Root node ID.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal descendants of a node and the sum of their scores
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LeafStats {
    pub leaves: usize,
    pub score_sum: f64,
}

impl LeafStats {
    /// Mean score over the terminal descendants, `None` when there are none
    pub fn mean(&self) -> Option<f64> {
        if self.leaves == 0 {
            None
        } else {
            Some(self.score_sum / self.leaves as f64)
        }
    }

    /// Leaves split into `(correct, incorrect)` by rounding `mean * leaves`
    /// half to even, clamped to `0..=leaves`
    pub fn tally(&self) -> Option<(usize, usize)> {
        let mean = self.mean()?;
        let leaves = self.leaves as f64;
        let correct = (mean * leaves).round_ties_even().clamp(0.0, leaves) as usize;
        Some((correct, self.leaves - correct))
    }
}

impl std::ops::AddAssign for LeafStats {
    fn add_assign(&mut self, rhs: Self) {
        self.leaves += rhs.leaves;
        self.score_sum += rhs.score_sum;
    }
}

/// A single vertex of a [`CompletionTree`](super::CompletionTree).
///
/// `fingerprint` and `stats` are filled in by the post-construction passes
/// and are always present on nodes reachable from a built tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) token: Token,
    pub(crate) children: BTreeMap<Token, NodeId>,
    pub(crate) terminal: bool,
    pub(crate) score: Option<f64>,
    pub(crate) count: usize,
    pub(crate) fingerprint: Option<Fingerprint>,
    pub(crate) stats: Option<LeafStats>,
}

impl Node {
    pub(crate) fn new(id: NodeId, token: Token) -> Self {
        Self {
            id,
            token,
            children: BTreeMap::new(),
            terminal: false,
            score: None,
            count: 0,
            fingerprint: None,
            stats: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn token(&self) -> Token {
        self.token
    }

    /// Whether at least one completion ends exactly here
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Score of the last completion that ended here, if it had one
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Number of completions passing through or ending at this node
    pub fn count(&self) -> usize {
        self.count
    }

    /// Child ids keyed by token, in ascending token order
    pub fn child_ids(&self) -> impl Iterator<Item = (Token, NodeId)> + '_ {
        self.children.iter().map(|(token, id)| (*token, *id))
    }

    pub fn child_id(&self, token: Token) -> Option<NodeId> {
        self.children.get(&token).copied()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    pub fn leaf_stats(&self) -> Option<LeafStats> {
        self.stats
    }

    pub fn descendant_leaf_count(&self) -> Option<usize> {
        self.stats.map(|s| s.leaves)
    }

    pub fn descendant_score_sum(&self) -> Option<f64> {
        self.stats.map(|s| s.score_sum)
    }
}
