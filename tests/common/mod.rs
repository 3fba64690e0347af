//! Common test utilities

#![allow(dead_code)]

use completion_tree::{CompletionTree, Node, NodeId, Token};

/// Build an unscored tree
pub fn build(completions: &[Vec<u32>]) -> CompletionTree {
    CompletionTree::build(completions, None).expect("valid batch")
}

/// Build a tree with one score per completion (or fewer)
pub fn build_scored(completions: &[Vec<u32>], scores: &[f64]) -> CompletionTree {
    CompletionTree::build(completions, Some(scores)).expect("valid batch")
}

/// Follow a token path from the root
pub fn node_at<'a>(tree: &'a CompletionTree, path: &[u32]) -> &'a Node {
    let mut current = NodeId::ROOT;
    for &token in path {
        current = tree[current]
            .child_id(Token::Id(token))
            .unwrap_or_else(|| panic!("no node at {:?}", path));
    }
    &tree[current]
}

/// Number of completions that are exactly `path`
pub fn endings(completions: &[Vec<u32>], path: &[u32]) -> usize {
    completions.iter().filter(|c| c.as_slice() == path).count()
}

/// Token path from the root to every node, in identity order
pub fn paths(tree: &CompletionTree) -> Vec<Vec<u32>> {
    let mut paths = vec![Vec::new(); tree.node_count()];
    for id in tree.breadth_first() {
        let prefix = paths[id.index()].clone();
        for (token, child) in tree[id].child_ids() {
            let mut path = prefix.clone();
            path.push(token.id().expect("token id"));
            paths[child.index()] = path;
        }
    }
    paths
}
