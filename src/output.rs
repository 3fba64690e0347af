//! Plain-text outline rendering

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::config::Config;
use crate::decode::{display_token, TokenDecoder};
use crate::tree::{CompletionTree, Fingerprint, Node, NodeId};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub max_label_len: usize,
    pub collapse_repeated: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_label_len: config.max_label_len,
            collapse_repeated: config.collapse_repeated,
        }
    }
}

/// Render a tree and write it to file
pub fn render_tree(
    tree: &CompletionTree,
    decoder: &dyn TokenDecoder,
    options: RenderOptions,
    output_path: &Path,
) -> Result<(), OutputError> {
    let content = render_to_string(tree, decoder, options);

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Render a tree as an indented outline, one node per line.
///
/// With `collapse_repeated`, a subtree whose fingerprint was already
/// printed is shown as a single line pointing at the first occurrence.
pub fn render_to_string(
    tree: &CompletionTree,
    decoder: &dyn TokenDecoder,
    options: RenderOptions,
) -> String {
    let mut output = String::new();
    let mut expanded: HashMap<Fingerprint, NodeId> = HashMap::new();
    let totals = tree.fingerprint_totals();
    let line = |node: &Node| node_line(tree, node, &totals, decoder, options);

    let root = tree.root();
    output.push_str(&line(root));
    output.push('\n');
    remember(&mut expanded, root);

    // (node, prefix, is_last), popped in ascending token order
    let mut stack: Vec<(NodeId, String, bool)> = Vec::new();
    push_children(root, "", &mut stack);

    while let Some((id, prefix, is_last)) = stack.pop() {
        let node = &tree[id];
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&prefix);
        output.push_str(connector);
        output.push_str(&line(node));

        let first = node
            .fingerprint()
            .and_then(|fp| expanded.get(&fp).copied())
            .filter(|_| options.collapse_repeated && node.has_children());
        if let Some(first) = first {
            let _ = write!(output, "  (same as {})", first);
            output.push('\n');
            continue;
        }
        output.push('\n');
        remember(&mut expanded, node);

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        push_children(node, &child_prefix, &mut stack);
    }

    output
}

fn remember(expanded: &mut HashMap<Fingerprint, NodeId>, node: &Node) {
    if let Some(fp) = node.fingerprint() {
        expanded.entry(fp).or_insert(node.id());
    }
}

fn push_children(node: &Node, prefix: &str, stack: &mut Vec<(NodeId, String, bool)>) {
    let count = node.num_children();
    for (i, &child) in node.children.values().enumerate().rev() {
        stack.push((child, prefix.to_string(), i + 1 == count));
    }
}

/// `<label> [<id>] n=<count>`, then `total=` when the fingerprint is shared,
/// the aggregate score with its correct/incorrect tally when scored, and a
/// `*` for terminal nodes
fn node_line(
    tree: &CompletionTree,
    node: &Node,
    totals: &HashMap<Fingerprint, usize>,
    decoder: &dyn TokenDecoder,
    options: RenderOptions,
) -> String {
    let mut line = display_token(node.token(), decoder, options.max_label_len);
    let _ = write!(line, " [{}] n={}", node.id(), node.count());

    let total = node.fingerprint().and_then(|fp| totals.get(&fp).copied());
    if let Some(total) = total.filter(|&t| t > node.count()) {
        let _ = write!(line, " total={}", total);
    }
    if let Some(pct) = tree.aggregate_score_percentage(node) {
        let _ = write!(line, " {:.1}%", pct * 100.0);
        if let Some((correct, incorrect)) = node.leaf_stats().and_then(|s| s.tally()) {
            let _ = write!(line, " {}✓/{}✗", correct, incorrect);
        }
    }
    if node.is_terminal() {
        line.push_str(" *");
    }
    line
}
