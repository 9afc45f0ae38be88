use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::tree::{IdGenerator, NodeId};

/// Name given to nodes created by the add operations.
pub const DEFAULT_NODE_NAME: &str = "New Node";

/// Whether an entry is materialized as a directory or as an empty file.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// Payload that differs between files and directories.
///
/// Only directories own a child collection, so a file can never carry
/// children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    File,
    Directory(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub selected: bool,
    pub expanded: bool,
    pub comment: Option<String>,
    pub depth: usize,
    pub body: NodeBody,
}

impl Node {
    pub fn directory(ids: &IdGenerator, name: impl Into<String>, depth: usize) -> Self {
        Self::new(ids, name, depth, NodeBody::Directory(Vec::new()))
    }

    pub fn file(ids: &IdGenerator, name: impl Into<String>, depth: usize) -> Self {
        Self::new(ids, name, depth, NodeBody::File)
    }

    pub fn of_kind(
        ids: &IdGenerator,
        kind: EntryKind,
        name: impl Into<String>,
        depth: usize,
    ) -> Self {
        match kind {
            EntryKind::File => Self::file(ids, name, depth),
            EntryKind::Directory => Self::directory(ids, name, depth),
        }
    }

    fn new(ids: &IdGenerator, name: impl Into<String>, depth: usize, body: NodeBody) -> Self {
        Self {
            id: ids.next_id(),
            name: name.into(),
            selected: true,
            expanded: true,
            comment: None,
            depth,
            body,
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn kind(&self) -> EntryKind {
        match self.body {
            NodeBody::File => EntryKind::File,
            NodeBody::Directory(_) => EntryKind::Directory,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.body, NodeBody::Directory(_))
    }

    /// Children of a directory, `None` for files.
    pub fn children(&self) -> Option<&[Node]> {
        match &self.body {
            NodeBody::File => None,
            NodeBody::Directory(children) => Some(children),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.body {
            NodeBody::File => None,
            NodeBody::Directory(children) => Some(children),
        }
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn count(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Node::count).sum())
            .unwrap_or(0)
    }

    /// Switches between file and directory. Becoming a directory starts with
    /// no children; becoming a file drops the existing children.
    pub fn set_kind(&mut self, kind: EntryKind) {
        if self.kind() == kind {
            return;
        }
        self.body = match kind {
            EntryKind::File => NodeBody::File,
            EntryKind::Directory => NodeBody::Directory(Vec::new()),
        };
    }
}

/// Aggregated counts over a forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub total: usize,
    pub selected: usize,
    pub directories: usize,
    pub files: usize,
}

/// Ordered sequence of root nodes.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    roots: Vec<Node>,
    ids: IdGenerator,
}

impl Forest {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            roots: Vec::new(),
            ids,
        }
    }

    pub fn from_roots(roots: Vec<Node>, ids: IdGenerator) -> Self {
        Self { roots, ids }
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<Node> {
        &mut self.roots
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Node::count).sum()
    }

    /// Pre-order walk over every node of the forest.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.walk().find(|node| node.id == id)
    }

    /// Looks a node up by its `/`-joined path from a root, e.g. `app/src`.
    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let first = segments.next()?;
        let mut current = self.roots.iter().find(|node| node.name == first)?;
        for segment in segments {
            current = current
                .children()?
                .iter()
                .find(|child| child.name == segment)?;
        }
        Some(current)
    }

    pub fn stats(&self) -> TreeStats {
        self.walk().fold(TreeStats::default(), |mut stats, node| {
            stats.total += 1;
            if node.selected {
                stats.selected += 1;
            }
            match node.kind() {
                EntryKind::Directory => stats.directories += 1,
                EntryKind::File => stats.files += 1,
            }
            stats
        })
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = node.children() {
            self.stack.extend(children.iter().rev());
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Forest {
        let ids = IdGenerator::new();
        let mut root = Node::directory(&ids, "app", 0);
        let mut src = Node::directory(&ids, "src", 1);
        if let Some(children) = src.children_mut() {
            children.push(Node::file(&ids, "main.rs", 2));
        }
        if let Some(children) = root.children_mut() {
            children.push(src);
            children.push(Node::file(&ids, "README.md", 1));
        }
        Forest::from_roots(vec![root], ids)
    }

    #[test]
    fn files_have_no_children() {
        let ids = IdGenerator::new();
        let file = Node::file(&ids, "a.txt", 0);
        assert!(file.children().is_none());
        assert_eq!(file.kind(), EntryKind::File);

        let dir = Node::directory(&ids, "a", 0);
        assert_eq!(dir.children(), Some(&[][..]));
    }

    #[test]
    fn walk_is_pre_order() {
        let forest = sample();
        let names = forest
            .walk()
            .map(|node| node.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["app", "src", "main.rs", "README.md"]);
    }

    #[test]
    fn find_by_path_follows_names() {
        let forest = sample();
        let node = forest.find_by_path("app/src/main.rs").expect("path exists");
        assert_eq!(node.name, "main.rs");
        assert_eq!(node.depth, 2);
        assert!(forest.find_by_path("app/missing").is_none());
        assert!(forest.find_by_path("app/README.md/nested").is_none());
    }

    #[test]
    fn stats_count_every_node() {
        let forest = sample();
        assert_eq!(
            forest.stats(),
            TreeStats {
                total: 4,
                selected: 4,
                directories: 2,
                files: 2,
            }
        );
        assert_eq!(forest.node_count(), 4);
    }

    #[test]
    fn set_kind_to_file_drops_children() {
        let mut forest = sample();
        let root = &mut forest.roots_mut()[0];
        root.set_kind(EntryKind::File);
        assert!(root.children().is_none());
        root.set_kind(EntryKind::Directory);
        assert_eq!(root.children().map(<[Node]>::len), Some(0));
    }
}
