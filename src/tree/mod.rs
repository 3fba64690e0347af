//! Shared-prefix tree of sampled completions
//!
//! Completions are inserted token by token under a single root. After
//! insertion two post-order passes run: one assigns every node a
//! structural [`Fingerprint`], the other aggregates terminal-descendant
//! statistics. The finished tree is immutable.
//!
//! Nodes are stored in creation order, so a [`NodeId`] is both the
//! node's identity and its index. Every traversal here is iterative;
//! depth is bounded only by memory.

mod builder;
mod fingerprint;
mod node;
mod stats;
mod summary;

pub use builder::TreeError;
pub use fingerprint::Fingerprint;
pub use node::{LeafStats, Node, NodeId, Token};
pub use summary::TreeSummary;

use std::collections::{HashMap, VecDeque};
use std::ops::Index;

/// A prefix tree built from one batch of completions
#[derive(Debug, Clone)]
pub struct CompletionTree {
    nodes: Vec<Node>,
    sequences: usize,
    has_scores: bool,
}

/// Nodes whose subtrees share one fingerprint
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedSubtree {
    pub fingerprint: Fingerprint,
    /// In breadth-first order; the first is the canonical node
    pub nodes: Vec<NodeId>,
    /// Path count summed over every node in the group
    pub total_count: usize,
}

impl CompletionTree {
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Whether a score list was supplied at construction
    pub fn has_scores(&self) -> bool {
        self.has_scores
    }

    /// Number of completions inserted
    pub fn num_sequences(&self) -> usize {
        self.sequences
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in identity order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Children of `node` in ascending token order
    pub fn children<'a>(
        &'a self,
        node: &'a Node,
    ) -> impl Iterator<Item = (Token, &'a Node)> + 'a {
        node.child_ids().map(move |(token, id)| (token, &self[id]))
    }

    /// Mean score of the terminal descendants of `node`.
    ///
    /// `None` when the tree was built without scores or the node has no
    /// terminal descendants.
    pub fn aggregate_score_percentage(&self, node: &Node) -> Option<f64> {
        if !self.has_scores {
            return None;
        }
        node.leaf_stats().and_then(|stats| stats.mean())
    }

    /// Node ids with every child before its parent, siblings in ascending
    /// token order
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut work = vec![Visit::Enter(NodeId::ROOT)];

        while let Some(visit) = work.pop() {
            match visit {
                Visit::Enter(id) => {
                    work.push(Visit::Exit(id));
                    work.extend(self[id].children.values().rev().map(|&c| Visit::Enter(c)));
                }
                Visit::Exit(id) => order.push(id),
            }
        }
        order
    }

    /// Node ids level by level from the root, siblings in ascending token order
    pub fn breadth_first(&self) -> Vec<NodeId> {
        self.levels().map(|(id, _)| id).collect()
    }

    /// Length of the longest root-to-node path in tokens
    pub fn depth(&self) -> usize {
        self.levels().map(|(_, depth)| depth).max().unwrap_or(0)
    }

    fn levels(&self) -> Levels<'_> {
        Levels {
            tree: self,
            queue: VecDeque::from([(NodeId::ROOT, 0)]),
        }
    }

    /// First node, in breadth-first order, for every distinct fingerprint.
    ///
    /// Renderers use this to draw a repeated branch once and point every
    /// other occurrence at it.
    pub fn canonical_nodes(&self) -> HashMap<Fingerprint, NodeId> {
        let mut canonical = HashMap::new();
        for id in self.breadth_first() {
            if let Some(fingerprint) = self[id].fingerprint() {
                canonical.entry(fingerprint).or_insert(id);
            }
        }
        canonical
    }

    /// Path count summed over every node sharing each fingerprint.
    ///
    /// A branch reached from several prefixes reports the completions that
    /// went through any copy of it.
    pub fn fingerprint_totals(&self) -> HashMap<Fingerprint, usize> {
        let mut totals = HashMap::new();
        for node in &self.nodes {
            if let Some(fingerprint) = node.fingerprint() {
                *totals.entry(fingerprint).or_insert(0) += node.count();
            }
        }
        totals
    }

    /// Fingerprints shared by more than one node, largest groups first
    pub fn repeated_subtrees(&self) -> Vec<RepeatedSubtree> {
        let mut groups: HashMap<Fingerprint, Vec<NodeId>> = HashMap::new();
        let mut first_seen = Vec::new();
        for id in self.breadth_first() {
            if let Some(fingerprint) = self[id].fingerprint() {
                let group = groups.entry(fingerprint).or_default();
                if group.is_empty() {
                    first_seen.push(fingerprint);
                }
                group.push(id);
            }
        }

        let mut repeated: Vec<RepeatedSubtree> = first_seen
            .into_iter()
            .filter_map(|fingerprint| {
                let nodes = groups.remove(&fingerprint)?;
                if nodes.len() < 2 {
                    return None;
                }
                let total_count = nodes.iter().map(|&id| self[id].count()).sum();
                Some(RepeatedSubtree {
                    fingerprint,
                    nodes,
                    total_count,
                })
            })
            .collect();
        // stable: ties keep breadth-first order of their canonical node
        repeated.sort_by(|a, b| b.nodes.len().cmp(&a.nodes.len()));
        repeated
    }
}

impl Index<NodeId> for CompletionTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

struct Levels<'a> {
    tree: &'a CompletionTree,
    queue: VecDeque<(NodeId, usize)>,
}

impl Iterator for Levels<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.queue.pop_front()?;
        self.queue.extend(
            self.tree[id]
                .children
                .values()
                .map(|&child| (child, depth + 1)),
        );
        Some((id, depth))
    }
}

/// Fill `slot` on every node reachable from the root, children before parents.
///
/// `combine` receives a node and its children's values in ascending token
/// order. Nodes whose slot is already filled are not recomputed, and
/// neither are their subtrees.
pub(crate) fn fold_post_order<T: Copy>(
    nodes: &mut [Node],
    slot: fn(&mut Node) -> &mut Option<T>,
    mut combine: impl FnMut(&Node, &[T]) -> T,
) {
    let mut work = vec![Visit::Enter(NodeId::ROOT)];
    let mut results: Vec<T> = Vec::new();

    while let Some(visit) = work.pop() {
        match visit {
            Visit::Enter(id) => {
                let node = &mut nodes[id.index()];
                if let Some(done) = *slot(node) {
                    results.push(done);
                    continue;
                }
                work.push(Visit::Exit(id));
                work.extend(node.children.values().rev().map(|&c| Visit::Enter(c)));
            }
            Visit::Exit(id) => {
                let node = &mut nodes[id.index()];
                let start = results.len() - node.children.len();
                let value = combine(&*node, &results[start..]);
                results.truncate(start);
                results.push(value);
                *slot(node) = Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::builder::{fingerprint_slot, stats_slot};
    use super::*;

    fn scenario() -> CompletionTree {
        let completions = vec![vec![1u32, 2, 3], vec![1, 2, 4], vec![1, 5]];
        CompletionTree::build(&completions, Some(&[1.0, 0.0, 1.0][..])).unwrap()
    }

    fn find(tree: &CompletionTree, path: &[u32]) -> NodeId {
        let mut current = NodeId::ROOT;
        for &token in path {
            current = tree[current].child_id(Token::Id(token)).unwrap();
        }
        current
    }

    #[test]
    fn test_scenario_counts_and_stats() {
        let tree = scenario();
        assert_eq!(tree.root().count(), 3);
        assert_eq!(tree[find(&tree, &[1])].count(), 3);

        let two = &tree[find(&tree, &[1, 2])];
        assert_eq!(two.count(), 2);
        assert_eq!(two.descendant_leaf_count(), Some(2));
        assert_eq!(two.descendant_score_sum(), Some(1.0));
        assert_eq!(tree.aggregate_score_percentage(two), Some(0.5));

        for path in [&[1, 2, 3][..], &[1, 2, 4], &[1, 5]] {
            let leaf = &tree[find(&tree, path)];
            assert_eq!(leaf.count(), 1);
            assert!(leaf.is_terminal());
            assert_eq!(leaf.descendant_leaf_count(), Some(1));
        }

        let root_pct = tree.aggregate_score_percentage(tree.root()).unwrap();
        assert!((root_pct - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_children_ascending() {
        let completions = vec![vec![9u32], vec![3], vec![7]];
        let tree = CompletionTree::build(&completions, None).unwrap();
        let tokens: Vec<Token> = tree.children(tree.root()).map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Id(3), Token::Id(7), Token::Id(9)]);
    }

    #[test]
    fn test_no_scores_means_no_percentage() {
        let completions = vec![vec![1u32]];
        let tree = CompletionTree::build(&completions, None).unwrap();
        assert!(!tree.has_scores());
        assert_eq!(tree.aggregate_score_percentage(tree.root()), None);
        assert_eq!(tree.root().descendant_leaf_count(), Some(1));
    }

    #[test]
    fn test_post_order_children_first() {
        let tree = scenario();
        let order = tree.post_order();
        assert_eq!(order.len(), tree.node_count());
        assert_eq!(*order.last().unwrap(), NodeId::ROOT);

        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for node in tree.nodes() {
            for (_, child) in node.child_ids() {
                assert!(position[&child] < position[&node.id()]);
            }
        }

        // leaves 3 and 4 under "2" come before 5
        let tokens: Vec<Token> = order.iter().map(|id| tree[*id].token()).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Id(3),
                Token::Id(4),
                Token::Id(2),
                Token::Id(5),
                Token::Id(1),
                Token::Root
            ]
        );
    }

    #[test]
    fn test_breadth_first_and_depth() {
        let tree = scenario();
        let tokens: Vec<Token> = tree
            .breadth_first()
            .iter()
            .map(|id| tree[*id].token())
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Root,
                Token::Id(1),
                Token::Id(2),
                Token::Id(5),
                Token::Id(3),
                Token::Id(4)
            ]
        );
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_passes_are_idempotent() {
        let tree = scenario();
        let mut nodes = tree.nodes.clone();

        fold_post_order(&mut nodes, fingerprint_slot, Fingerprint::of);
        fold_post_order(&mut nodes, stats_slot, stats::leaf_stats);
        for (before, after) in tree.nodes.iter().zip(&nodes) {
            assert_eq!(before.fingerprint, after.fingerprint);
            assert_eq!(before.stats, after.stats);
        }

        for node in &mut nodes {
            node.fingerprint = None;
            node.stats = None;
        }
        fold_post_order(&mut nodes, fingerprint_slot, Fingerprint::of);
        fold_post_order(&mut nodes, stats_slot, stats::leaf_stats);
        for (before, after) in tree.nodes.iter().zip(&nodes) {
            assert_eq!(before.fingerprint, after.fingerprint);
            assert_eq!(before.stats, after.stats);
        }
    }

    #[test]
    fn test_repeated_suffixes_share_fingerprints() {
        // "7 8" ends both completions after different first tokens
        let completions = vec![vec![1u32, 7, 8], vec![2, 7, 8], vec![3, 9]];
        let tree = CompletionTree::build(&completions, None).unwrap();

        let a = &tree[find(&tree, &[1, 7])];
        let b = &tree[find(&tree, &[2, 7])];
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.id(), b.id());

        let repeated = tree.repeated_subtrees();
        // {7 -> 8} and the terminal {8}
        assert_eq!(repeated.len(), 2);
        assert!(repeated.iter().all(|group| group.nodes.len() == 2));
        assert_eq!(repeated[0].nodes, vec![a.id(), b.id()]);
        assert_eq!(repeated[0].total_count, 2);

        let canonical = tree.canonical_nodes();
        assert_eq!(canonical[&b.fingerprint().unwrap()], a.id());
        assert_eq!(canonical.len(), tree.node_count() - 2);
    }

    #[test]
    fn test_fingerprint_totals_sum_counts() {
        let completions = vec![vec![1u32, 7, 8], vec![1, 7, 8], vec![2, 7, 8], vec![2, 5]];
        let tree = CompletionTree::build(&completions, None).unwrap();

        let seven = &tree[find(&tree, &[1, 7])];
        assert_eq!(seven.count(), 2);
        let totals = tree.fingerprint_totals();
        assert_eq!(totals[&seven.fingerprint().unwrap()], 3);
        assert_eq!(totals[&tree.root().fingerprint().unwrap()], 4);
        assert_eq!(totals[&tree[find(&tree, &[2, 5])].fingerprint().unwrap()], 1);

        let group = &tree.repeated_subtrees()[0];
        assert_eq!(group.nodes[0], seven.id());
        assert_eq!(group.total_count, 3);
    }

    #[test]
    fn test_deep_tree_does_not_overflow() {
        let deep: Vec<u32> = (0..200_000).map(|i| i % 5).collect();
        let completions = vec![deep.clone(), deep];
        let tree = CompletionTree::build(&completions, Some(&[1.0, 0.0][..])).unwrap();
        assert_eq!(tree.depth(), 200_000);
        assert_eq!(tree.post_order().len(), 200_001);
        assert_eq!(tree.aggregate_score_percentage(tree.root()), Some(0.0));
    }
}
