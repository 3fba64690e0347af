//! Terminal-descendant statistics
//!
//! A terminal node is a base case: it counts as exactly one leaf carrying
//! its own score, and its children's statistics are NOT folded in, even
//! when the node has children (a completion that is a strict prefix of
//! another). The children still get their own statistics. Only
//! non-terminal nodes sum over their children.

use super::node::{LeafStats, Node};

/// Combine a node with its children's already-computed statistics
pub(crate) fn leaf_stats(node: &Node, children: &[LeafStats]) -> LeafStats {
    if node.terminal {
        return LeafStats {
            leaves: 1,
            score_sum: node.score.unwrap_or(0.0),
        };
    }

    let mut total = LeafStats::default();
    for stats in children {
        total += *stats;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::{NodeId, Token};

    fn node(terminal: bool, score: Option<f64>) -> Node {
        let mut node = Node::new(NodeId(1), Token::Id(1));
        node.terminal = terminal;
        node.score = score;
        node
    }

    #[test]
    fn test_terminal_is_one_leaf() {
        let stats = leaf_stats(&node(true, Some(0.75)), &[]);
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.score_sum, 0.75);
    }

    #[test]
    fn test_unscored_terminal_contributes_zero() {
        let stats = leaf_stats(&node(true, None), &[]);
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.score_sum, 0.0);
    }

    #[test]
    fn test_internal_sums_children() {
        let children = [
            LeafStats {
                leaves: 2,
                score_sum: 1.0,
            },
            LeafStats {
                leaves: 1,
                score_sum: 1.0,
            },
        ];
        let stats = leaf_stats(&node(false, None), &children);
        assert_eq!(stats.leaves, 3);
        assert_eq!(stats.score_sum, 2.0);
    }

    #[test]
    fn test_terminal_ignores_children() {
        let children = [LeafStats {
            leaves: 5,
            score_sum: 4.0,
        }];
        let stats = leaf_stats(&node(true, Some(0.0)), &children);
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.score_sum, 0.0);
    }
}
