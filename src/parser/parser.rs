use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::parser::line::{Entry, Indent, Line, lex};
use crate::tree::{EntryKind, Forest, IdGenerator, Node, NodeBody};

/// Column width of one level in connector-drawn text when the document does
/// not reveal its own.
const DEFAULT_TREE_UNIT: usize = 4;
/// Narrowest level width a connector-drawn document can use (`├─ `).
const MIN_TREE_UNIT: usize = 2;
/// Columns per level in plainly indented text.
const INDENT_UNIT: usize = 2;

/// Turns pasted structure text into a forest.
///
/// Parsing never fails: every non-blank line yields at least one node.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    ids: IdGenerator,
}

/// Parses with a fresh id generator.
pub fn parse(text: &str) -> Forest {
    Parser::default().parse(text)
}

/// Node under construction, addressed by its index in the arena.
struct Slot {
    name: String,
    kind: EntryKind,
    comment: Option<String>,
    children: Vec<usize>,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    roots: Vec<usize>,
    /// Most recently emitted node per line depth.
    latest: Vec<Option<usize>>,
}

impl Arena {
    fn push(&mut self, name: String, kind: EntryKind, comment: Option<String>) -> usize {
        self.slots.push(Slot {
            name,
            kind,
            comment,
            children: Vec::new(),
        });
        self.slots.len() - 1
    }

    /// Creates the nodes for `entry`, hangs them under the most recent node
    /// one level up (or at the root when there is none) and records the
    /// last one as the most recent node at `depth`.
    fn attach(&mut self, entry: Entry, depth: usize) {
        let Entry {
            segments,
            kind,
            comment,
        } = entry;
        let count = segments.len();
        let mut comment = comment;
        let mut parent = depth
            .checked_sub(1)
            .and_then(|above| self.latest.get(above).copied().flatten());

        if parent.is_none() && depth > 0 {
            debug!("No parent at depth {} for '{}', adding as root", depth - 1, segments.join("/"));
        }

        for (index, name) in segments.into_iter().enumerate() {
            let last = index + 1 == count;
            let (kind, comment) = if last {
                (kind, comment.take())
            } else {
                (EntryKind::Directory, None)
            };
            let slot = self.push(name, kind, comment);

            match parent {
                Some(parent) => {
                    let parent = &mut self.slots[parent];
                    if parent.kind == EntryKind::File {
                        trace!("Promoting '{}' to a directory, it has children", parent.name);
                        parent.kind = EntryKind::Directory;
                    }
                    parent.children.push(slot);
                }
                None => self.roots.push(slot),
            }
            parent = Some(slot);
        }

        if self.latest.len() <= depth {
            self.latest.resize(depth + 1, None);
        }
        self.latest[depth] = parent;
    }

    fn build(&self, ids: &IdGenerator, index: usize, depth: usize) -> Node {
        let slot = &self.slots[index];
        let mut node = Node::of_kind(ids, slot.kind, slot.name.clone(), depth)
            .with_comment(slot.comment.clone());
        if let NodeBody::Directory(children) = &mut node.body {
            children.extend(
                slot.children
                    .iter()
                    .map(|child| self.build(ids, *child, depth + 1)),
            );
        }
        node
    }

    fn into_forest(self, ids: IdGenerator) -> Forest {
        let roots = self
            .roots
            .iter()
            .map(|root| self.build(&ids, *root, 0))
            .collect();
        Forest::from_roots(roots, ids)
    }
}

/// Depth rule shared by every line of one document.
///
/// Connector lines count one level per vertical glyph before the connector,
/// or per tree unit of columns when that is larger (the whitespace `tree`
/// prints under a last child has no glyph). The tree unit is the connector
/// offset that most other connector offsets are multiples of. Indented lines count one level
/// per two columns beyond the first line's indentation.
struct DepthRule {
    glyph_base: usize,
    tree_unit: usize,
    indent_base: usize,
}

impl DepthRule {
    fn for_lines(lines: &[Line<'_>]) -> Self {
        let columns = lines
            .iter()
            .skip(1)
            .filter_map(|line| match line.indent {
                Indent::Glyph { column, .. } => Some(column),
                Indent::Whitespace { .. } => None,
            })
            .collect::<Vec<_>>();
        let glyph_base = columns.iter().copied().min().unwrap_or(0);
        let offsets = columns
            .iter()
            .map(|column| column - glyph_base)
            .filter(|offset| *offset > 0)
            .collect::<Vec<_>>();
        // The unit that lines up the most connectors wins, the smaller one on
        // a tie; a single stray column never decides it.
        let tree_unit = offsets
            .iter()
            .copied()
            .filter(|offset| *offset >= MIN_TREE_UNIT)
            .max_by_key(|unit| {
                let aligned = offsets.iter().filter(|offset| *offset % unit == 0).count();
                (aligned, Reverse(*unit))
            })
            .unwrap_or(DEFAULT_TREE_UNIT);
        let indent_base = match lines.first().map(|line| line.indent) {
            Some(Indent::Whitespace { columns }) => columns,
            _ => 0,
        };

        Self {
            glyph_base,
            tree_unit,
            indent_base,
        }
    }

    fn depth(&self, indent: Indent) -> usize {
        match indent {
            Indent::Glyph { verticals, column } => {
                let by_columns = (column - self.glyph_base) / self.tree_unit;
                verticals.max(by_columns) + 1
            }
            Indent::Whitespace { columns } => {
                columns.saturating_sub(self.indent_base) / INDENT_UNIT
            }
        }
    }
}

impl Parser {
    pub fn new(ids: IdGenerator) -> Self {
        Self { ids }
    }

    pub fn parse(&self, text: &str) -> Forest {
        let lines = text.lines().filter_map(lex).collect::<Vec<_>>();
        let Some((first, rest)) = lines.split_first() else {
            debug!("No structure lines in input");
            return Forest::new(self.ids.clone());
        };

        let rule = DepthRule::for_lines(&lines);
        let mut arena = Arena::default();

        let root = Entry::from_text(first.text);
        arena.attach(
            Entry {
                kind: EntryKind::Directory,
                ..root
            },
            0,
        );

        for line in rest {
            let depth = rule.depth(line.indent);
            trace!("Line '{}' at depth {}", line.text, depth);
            arena.attach(Entry::from_text(line.text), depth);
        }

        let forest = arena.into_forest(self.ids.clone());
        debug!(
            "Parsed {} lines into {} roots and {} nodes",
            lines.len(),
            forest.roots().len(),
            forest.node_count()
        );
        forest
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;
    use crate::tree::{ExecutionItem, flatten};

    fn items(text: &str) -> Vec<(String, EntryKind)> {
        flatten(&parse(text))
            .into_iter()
            .map(|ExecutionItem { path, kind }| (path, kind))
            .collect()
    }

    fn dir(path: &str) -> (String, EntryKind) {
        (path.to_string(), EntryKind::Directory)
    }

    fn file(path: &str) -> (String, EntryKind) {
        (path.to_string(), EntryKind::File)
    }

    fn assert_invariants(forest: &Forest) {
        fn check(node: &Node, depth: usize, seen: &mut HashSet<crate::tree::NodeId>) {
            assert_eq!(node.depth, depth, "depth of '{}'", node.name);
            assert!(!node.name.is_empty());
            assert!(!node.name.contains('/'), "separator in '{}'", node.name);
            assert!(seen.insert(node.id), "duplicate id {}", node.id);
            assert_eq!(node.children().is_some(), node.kind() == EntryKind::Directory);
            for child in node.children().unwrap_or_default() {
                check(child, depth + 1, seen);
            }
        }

        let mut seen = HashSet::new();
        for root in forest.roots() {
            check(root, 0, &mut seen);
        }
    }

    #[test]
    fn parses_the_app_scenario() {
        let forest = parse("app/\n├── src/\n│   └── index.ts**\n└── README.md\n");

        assert_eq!(forest.roots().len(), 1);
        let app = &forest.roots()[0];
        assert_eq!(app.name, "app");
        assert_eq!(app.kind(), EntryKind::Directory);
        assert_eq!(app.depth, 0);
        assert!(app.selected && app.expanded);

        let children = app.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!((children[0].name.as_str(), children[0].kind()), ("src", EntryKind::Directory));
        assert_eq!((children[1].name.as_str(), children[1].kind()), ("README.md", EntryKind::File));
        assert!(children.iter().all(|child| child.depth == 1));

        let index = &children[0].children().unwrap()[0];
        assert_eq!((index.name.as_str(), index.kind(), index.depth), ("index.ts", EntryKind::File, 2));

        assert_eq!(
            items("app/\n├── src/\n│   └── index.ts**\n└── README.md\n"),
            vec![dir("app"), dir("app/src"), file("app/src/index.ts"), file("app/README.md")]
        );
    }

    #[test]
    fn parses_indented_text() {
        assert_eq!(
            items("project/\n  src/\n    components/\n      Button.tsx\n      Card.tsx\n  README.md\n"),
            vec![
                dir("project"),
                dir("project/src"),
                dir("project/src/components"),
                file("project/src/components/Button.tsx"),
                file("project/src/components/Card.tsx"),
                file("project/README.md"),
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(parse("").is_empty());
        assert!(parse("\n   \n\t\n").is_empty());
    }

    #[test]
    fn first_line_is_always_a_directory_root() {
        let forest = parse("README.md");
        let root = &forest.roots()[0];
        assert_eq!(root.name, "README.md");
        assert_eq!(root.kind(), EntryKind::Directory);
        assert_eq!(root.depth, 0);
    }

    #[test]
    fn first_line_comment_is_captured() {
        let forest = parse("mongodb-runner/   # project root\n");
        let root = &forest.roots()[0];
        assert_eq!(root.name, "mongodb-runner");
        assert_eq!(root.comment.as_deref(), Some("project root"));
    }

    #[test]
    fn unindented_lines_become_additional_roots() {
        assert_eq!(
            items("frontend/\n  package.json\nbackend/\n  Cargo.toml\n"),
            vec![
                dir("frontend"),
                file("frontend/package.json"),
                dir("backend"),
                file("backend/Cargo.toml"),
            ]
        );
    }

    #[test]
    fn orphaned_deep_lines_become_roots() {
        let forest = parse("app/\n      deep.txt\n");
        let names = forest.roots().iter().map(|node| node.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["app", "deep.txt"]);
        assert_eq!(forest.roots()[1].depth, 0);
        assert_invariants(&forest);
    }

    #[test]
    fn skipped_levels_still_yield_consistent_depths() {
        // `b` sits at line depth 1, `c` at line depth 3 attaches nowhere and
        // `d` at line depth 2 finds `b`.
        let forest = parse("root/\n  b/\n      c.txt\n    d.txt\n");
        assert_invariants(&forest);
        assert!(forest.find_by_path("root/b/d.txt").is_some());
        assert!(forest.find_by_path("c.txt").is_some());
    }

    #[test]
    fn parent_pool_is_most_recent_per_depth() {
        // `x` at depth 3 attaches to `deep`, the last depth-2 node, even
        // though `c` at depth 1 came later.
        let forest = parse("r/\n  a/\n    deep/\n  c/\n      x.txt\n");
        assert!(forest.find_by_path("r/a/deep/x.txt").is_some());
        assert_invariants(&forest);
    }

    #[test]
    fn last_child_whitespace_counts_as_ancestor_column() {
        // Pure glyph counting would put `main.rs` at depth 1; the column rule
        // places it under `src`.
        assert_eq!(
            items("app/\n└── src/\n    └── main.rs\n"),
            vec![dir("app"), dir("app/src"), file("app/src/main.rs")]
        );
    }

    #[rstest]
    #[case::stray_space_before_top_level("app/\n├── src/\n│   ├── lib.rs\n│   └── main.rs\n ├── README.md\n└── docs/\n")]
    #[case::stray_space_before_nested("app/\n├── src/\n│    ├── lib.rs\n│   └── main.rs\n├── README.md\n└── docs/\n")]
    fn one_misaligned_connector_keeps_the_rest_in_place(#[case] text: &str) {
        assert_eq!(
            items(text),
            vec![
                dir("app"),
                dir("app/src"),
                file("app/src/lib.rs"),
                file("app/src/main.rs"),
                file("app/README.md"),
                dir("app/docs"),
            ]
        );
    }

    #[test]
    fn deep_last_child_columns_share_the_smallest_unit() {
        assert_eq!(
            items("a/\n└── b/\n    └── c/\n        ├── d.txt\n        └── e.txt\n"),
            vec![dir("a"), dir("a/b"), dir("a/b/c"), file("a/b/c/d.txt"), file("a/b/c/e.txt")]
        );
    }

    #[test]
    fn compact_two_column_trees_infer_their_unit() {
        assert_eq!(
            items("app/\n├─ src/\n│ └─ lib.rs\n└─ docs/\n  └─ guide.md\n"),
            vec![dir("app"), dir("app/src"), file("app/src/lib.rs"), dir("app/docs"), file("app/docs/guide.md")]
        );
    }

    #[test]
    fn uniformly_indented_tree_is_parsed_relative_to_itself() {
        assert_eq!(
            items("    app/\n    ├── src/\n    │   └── lib.rs\n    └── a.txt\n"),
            vec![dir("app"), dir("app/src"), file("app/src/lib.rs"), file("app/a.txt")]
        );
        assert_eq!(
            items("    app/\n      src/\n        lib.rs\n"),
            vec![dir("app"), dir("app/src"), file("app/src/lib.rs")]
        );
    }

    #[test]
    fn ascii_tree_output_is_understood() {
        assert_eq!(
            items(".\n|-- src\n|   `-- main.c\n`-- Makefile**\n"),
            vec![dir("."), dir("./src"), file("./src/main.c"), file("./Makefile")]
        );
    }

    #[test]
    fn spacer_lines_are_ignored() {
        assert_eq!(
            items("app/\n│\n├── a/\n│\n└── b.txt\n"),
            vec![dir("app"), dir("app/a"), file("app/b.txt")]
        );
    }

    #[test]
    fn files_with_children_are_promoted() {
        let forest = parse("repo/\n  .github\n    workflows/\n");
        let github = forest.find_by_path("repo/.github").unwrap();
        assert_eq!(github.kind(), EntryKind::Directory);
        assert!(forest.find_by_path("repo/.github/workflows").is_some());
    }

    #[test]
    fn nested_paths_expand_to_directory_chains() {
        let forest = parse("app/\n  src/utils/  # helpers\n    date.ts\n");
        assert_invariants(&forest);
        let utils = forest.find_by_path("app/src/utils").unwrap();
        assert_eq!(utils.comment.as_deref(), Some("helpers"));
        assert_eq!(utils.depth, 2);
        assert_eq!(forest.find_by_path("app/src").unwrap().comment, None);
        assert_eq!(forest.find_by_path("app/src/utils/date.ts").unwrap().depth, 3);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        assert_eq!(items("app/\r\n  a.txt\r\n"), vec![dir("app"), file("app/a.txt")]);
    }

    #[test]
    fn parses_the_documented_example() {
        let text = "mongodb-runner/
├── src/                      # Frontend Next.js code
│   ├── app/                  # Next.js app directory
│   │   ├── api/              # API routes
│   │   │   ├── connection/   # Connection management endpoints
│   │   │   └── stored-connections/ # Connection storage endpoints
│   │   ├── globals.css       # Global styles
│   │   └── page.tsx          # Home page
│   ├── components/           # React components
│   │   ├── ConnectionManager.tsx
│   │   └── QueryEditor.tsx**
├── backend/                  # Backend Express.js server
│   ├── src/
│   │   ├── app.ts            # Express app setup
│   │   ├── routes/           # API routes
│   │   │   └── index.ts**
└── README.md**";
        let forest = parse(text);
        assert_invariants(&forest);
        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.node_count(), 17);

        let api = forest.find_by_path("mongodb-runner/src/app/api").unwrap();
        assert_eq!(api.comment.as_deref(), Some("API routes"));
        assert_eq!(api.depth, 3);
        assert_eq!(
            forest
                .find_by_path("mongodb-runner/backend/src/routes/index.ts")
                .map(Node::kind),
            Some(EntryKind::File)
        );
        assert_eq!(
            forest.find_by_path("mongodb-runner/README.md").map(|node| node.depth),
            Some(1)
        );
    }

    #[rstest]
    #[case("")]
    #[case("single")]
    #[case("no glyphs at all\nanother line\n  indented")]
    #[case("├── starts with a connector\n│   └── child")]
    #[case("###\n/\n//\n├──\n└── # only comment\n\t\t\tx")]
    #[case("a/\n        very deep.txt\n  back.txt\n    │ weird │ mix ├── y")]
    #[case("名前/\n  ファイル.txt\n  └── 子/")]
    fn parsing_is_total_and_keeps_invariants(#[case] text: &str) {
        let forest = parse(text);
        assert_invariants(&forest);
        let lines = text.lines().filter(|line| lex(line).is_some()).count();
        assert!(forest.node_count() >= lines);
    }

    #[test]
    fn reparsing_allocates_new_ids() {
        let parser = Parser::new(IdGenerator::new());
        let first = parser.parse("app/\n  a.txt\n");
        let second = parser.parse("app/\n  a.txt\n");
        let first_ids = first.walk().map(|node| node.id).collect::<HashSet<_>>();
        assert!(second.walk().all(|node| !first_ids.contains(&node.id)));
    }
}
