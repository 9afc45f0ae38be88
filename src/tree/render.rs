use crate::tree::paths::{display_name, with_comment};
use crate::tree::{Forest, Node};

const TEE: &str = "├── ";
const ELBOW: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

/// Draws the selected nodes with box-drawing connectors, the way `tree`
/// prints them. The output parses back into the same forest shape.
pub fn render_tree(forest: &Forest) -> String {
    let mut out = String::new();
    for root in forest.roots().iter().filter(|node| node.selected) {
        out.push_str(&with_comment(display_name(root), root));
        out.push('\n');
        render_children(root, "", &mut out);
    }
    out
}

fn render_children(node: &Node, prefix: &str, out: &mut String) {
    let visible = node
        .children()
        .unwrap_or_default()
        .iter()
        .filter(|child| child.selected)
        .collect::<Vec<_>>();

    for (index, child) in visible.iter().enumerate() {
        let last = index + 1 == visible.len();
        let connector = if last { ELBOW } else { TEE };
        out.push_str(&with_comment(
            format!("{prefix}{connector}{}", display_name(child)),
            child,
        ));
        out.push('\n');

        let nested = format!("{prefix}{}", if last { BLANK } else { PIPE });
        render_children(child, &nested, out);
    }
}
