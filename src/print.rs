use crate::node::{Node, NodeArena, Ptr};

const EMPTY: &str = "∅";

/// Renders the subtree under `root` as a box-drawing dump:
///
/// ```text
/// 4
/// ├─ 2
/// │  ├─ 1
/// │  └─ 3
/// └─ 6
///    ├─ ∅
///    └─ 7
/// ```
///
/// Left children are listed before right ones. A missing child is drawn as
/// `∅` only when its sibling exists, so leaves stay one line long.
pub(crate) fn render_tree<K, V>(
    nodes: &NodeArena<K, V>,
    root: Ptr,
    label: impl Fn(&Node<K, V>) -> String,
) -> String {
    if root.is_null() {
        return EMPTY.to_string();
    }

    let mut out = String::new();
    // (node, indent for this line, branch glyph, indent for its children)
    let mut stack: Vec<(Ptr, String, &str, String)> = vec![(root, String::new(), "", String::new())];

    while let Some((ptr, tab, branch, child_tab)) = stack.pop() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&tab);
        out.push_str(branch);
        if ptr.is_null() {
            out.push_str(EMPTY);
            continue;
        }
        let node = &nodes[ptr];
        out.push_str(&label(node));
        if node.is_leaf() {
            continue;
        }

        // Pushed right first so the left child is printed first.
        stack.push((node.right, child_tab.clone(), "└─ ", format!("{child_tab}   ")));
        stack.push((node.left, child_tab.clone(), "├─ ", format!("{child_tab}│  ")));
    }

    out
}
