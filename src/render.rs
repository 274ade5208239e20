//! ASCII rendering of a loaded tree for the CLI.

use std::io::{self, Write};

use crate::tree::TreeNode;

/// Write `root` and everything loaded beneath it as an ASCII tree.
///
/// Collapsed-but-loaded subtrees are rendered (the data is there);
/// unloaded nodes simply have no children to show.
pub fn write_tree<W: Write>(writer: &mut W, root: &TreeNode) -> io::Result<()> {
    writeln!(writer, "{}", node_text(root))?;
    write_children_inner(writer, &root.children(), &[])
}

fn node_text(node: &TreeNode) -> String {
    if node.is_placeholder() {
        return "[+ create folder]".to_string();
    }
    let mut text = node.name();
    text.push('/');
    // Server-provided display label, when it differs from the path leaf.
    if let Some(label) = node.label() {
        if label != node.name() {
            text.push_str(&format!(" ({label})"));
        }
    }
    text
}

fn write_children_inner<W: Write>(
    writer: &mut W,
    children: &[TreeNode],
    ancestor_has_more: &[bool],
) -> io::Result<()> {
    for (index, node) in children.iter().enumerate() {
        let is_last = index + 1 == children.len();

        for &has_more in ancestor_has_more {
            if has_more {
                writer.write_all(b"|   ")?;
            } else {
                writer.write_all(b"    ")?;
            }
        }

        if is_last {
            writer.write_all(b"`-- ")?;
        } else {
            writer.write_all(b"|-- ")?;
        }

        writer.write_all(node_text(node).as_bytes())?;
        writer.write_all(b"\n")?;

        let grandchildren = node.children();
        if !grandchildren.is_empty() {
            let mut next_ancestor_has_more = ancestor_has_more.to_vec();
            next_ancestor_has_more.push(!is_last);
            write_children_inner(writer, &grandchildren, &next_ancestor_has_more)?;
        }
    }

    Ok(())
}
