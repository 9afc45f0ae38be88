use serde::{Deserialize, Serialize};

use crate::tree::{EntryKind, Forest, Node};

/// Marker that tells the parser an entry is a file regardless of its name.
pub const FILE_MARKER: &str = "**";

const INDENT: &str = "  ";

/// A path relative to the target directory, slated for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionItem {
    pub path: String,
    pub kind: EntryKind,
}

impl ExecutionItem {
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Resolves the selected nodes to `/`-joined paths, in pre-order.
///
/// An unselected node hides its whole subtree, even selected descendants.
pub fn flatten(forest: &Forest) -> Vec<ExecutionItem> {
    fn visit(node: &Node, parent: Option<&str>, items: &mut Vec<ExecutionItem>) {
        if !node.selected {
            return;
        }
        let path = match parent {
            Some(parent) => format!("{parent}/{}", node.name),
            None => node.name.clone(),
        };
        items.push(ExecutionItem::new(path.clone(), node.kind()));
        for child in node.children().unwrap_or_default() {
            visit(child, Some(&path), items);
        }
    }

    let mut items = Vec::new();
    for root in forest.roots() {
        visit(root, None, &mut items);
    }
    items
}

/// Name as written back to text, with the kind made explicit where the
/// parser would otherwise guess differently.
pub(crate) fn display_name(node: &Node) -> String {
    match node.kind() {
        EntryKind::Directory => format!("{}/", node.name),
        EntryKind::File if node.name.contains('.') => node.name.clone(),
        EntryKind::File => format!("{}{FILE_MARKER}", node.name),
    }
}

pub(crate) fn with_comment(mut line: String, node: &Node) -> String {
    if let Some(comment) = &node.comment {
        line.push_str(" # ");
        line.push_str(comment);
    }
    line
}

/// Renders the selected nodes as indented text, two spaces per level.
pub fn serialize_to_text(forest: &Forest) -> String {
    fn visit(node: &Node, level: usize, out: &mut String) {
        if !node.selected {
            return;
        }
        let line = with_comment(format!("{}{}", INDENT.repeat(level), display_name(node)), node);
        out.push_str(&line);
        out.push('\n');
        for child in node.children().unwrap_or_default() {
            visit(child, level + 1, out);
        }
    }

    let mut out = String::new();
    for root in forest.roots() {
        visit(root, 0, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SCENARIO: &str = "app/\n├── src/\n│   └── index.ts**\n└── README.md\n";

    #[test]
    fn flatten_resolves_paths_in_order() {
        let items = flatten(&parse(SCENARIO));
        assert_eq!(
            items,
            vec![
                ExecutionItem::new("app", EntryKind::Directory),
                ExecutionItem::new("app/src", EntryKind::Directory),
                ExecutionItem::new("app/src/index.ts", EntryKind::File),
                ExecutionItem::new("app/README.md", EntryKind::File),
            ]
        );
    }

    #[test]
    fn flatten_excludes_unselected_subtrees() {
        let forest = parse(SCENARIO);
        let src = forest.find_by_path("app/src").unwrap().id;
        let index = forest.find_by_path("app/src/index.ts").unwrap().id;
        let forest = forest.set_selected(src, false).set_selected(index, true);

        let paths = flatten(&forest)
            .into_iter()
            .map(|item| item.path)
            .collect::<Vec<_>>();

        assert_eq!(paths, vec!["app", "app/README.md"]);
    }

    #[test]
    fn flatten_handles_multiple_roots() {
        let items = flatten(&parse("one/\ntwo/\n  x.txt\n"));
        let paths = items.iter().map(|item| item.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, vec!["one", "two", "two/x.txt"]);
    }

    #[test]
    fn serialize_writes_indented_lines_with_comments() {
        let forest = parse("app/ # the app\n├── src/\n│   └── Makefile** # build\n└── README.md\n");
        assert_eq!(
            serialize_to_text(&forest),
            "app/ # the app\n  src/\n    Makefile** # build\n  README.md\n"
        );
    }

    #[test]
    fn serialize_and_flatten_agree_on_selection() {
        let forest = parse(SCENARIO);
        let src = forest.find_by_path("app/src").unwrap().id;
        let forest = forest.set_selected(src, false);

        let text = serialize_to_text(&forest);

        assert_eq!(text, "app/\n  README.md\n");
        assert_eq!(flatten(&parse(&text)), flatten(&forest));
    }

    #[test]
    fn round_trip_preserves_flattened_items() {
        let input = "project/\n  src/\n    components/\n      Button.tsx\n      Card.tsx\n    LICENSE**\n  docs/\n  README.md\nsecond/\n  notes.txt\n";
        let forest = parse(input);
        let reparsed = parse(&serialize_to_text(&forest));
        assert_eq!(flatten(&reparsed), flatten(&forest));
    }

    #[test]
    fn serialize_of_empty_forest_is_empty() {
        assert_eq!(serialize_to_text(&parse("")), "");
    }
}
