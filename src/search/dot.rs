//! GraphViz dump of a finished search tree.
//!
//! Edges follow parent links; labels are the SAN of the incoming move,
//! optionally annotated with visit count, accumulated value and UCT score.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::ChessError;
use crate::search::mcts::SearchTree;
use crate::utils::san::move_to_san;

/// Render the tree as a `digraph`. Nodes deeper than `max_depth` are
/// omitted when a limit is given.
pub(crate) fn render_dot(tree: &SearchTree, verbose: bool, max_depth: Option<usize>) -> String {
    let mut out = String::from("digraph search_tree {\n");

    for (id, node) in tree.nodes.iter().enumerate() {
        let depth = tree.node_depth(id);
        if matches!(max_depth, Some(limit) if depth > limit) {
            continue;
        }

        let move_label = match node.parent {
            None => "ROOT".to_owned(),
            Some(parent) => {
                let parent_board = &tree.nodes[parent].board;
                move_to_san(parent_board, &node.last_move)
                    .unwrap_or_else(|_| node.last_move.to_string())
            }
        };

        let label = if verbose {
            let uct = match node.parent {
                Some(parent) if node.expand_count > 0 => format!(
                    "{:.3}",
                    tree.uct_score(tree.nodes[parent].expand_count, id)
                ),
                _ => "inf".to_owned(),
            };
            format!(
                "{} (count: {})\\nval: {}, UCT: {}",
                move_label, node.expand_count, node.value, uct
            )
        } else {
            move_label
        };

        out.push_str(&format!("  {id} [label=\"{label}\"]\n"));
        if let Some(parent) = node.parent {
            out.push_str(&format!("  {parent}->{id}\n"));
        }
    }

    out.push_str("}\n");
    out
}

pub(crate) fn write_dot_file(
    tree: &SearchTree,
    path: &Path,
    verbose: bool,
) -> Result<(), ChessError> {
    let mut file = File::create(path)?;
    file.write_all(render_dot(tree, verbose, None).as_bytes())?;
    Ok(())
}
