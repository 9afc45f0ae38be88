//! Immutable update operations on a [`Forest`].
//!
//! Every operation leaves `self` untouched and returns the updated forest.

use snafu::Snafu;
use tracing::debug;

use crate::tree::{DEFAULT_NODE_NAME, EntryKind, Forest, Node, NodeId};

/// Editable field set of a node, applied by [`Forest::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEdit {
    pub id: NodeId,
    pub name: String,
    pub kind: EntryKind,
    pub comment: Option<String>,
    pub selected: bool,
}

impl NodeEdit {
    /// Starts an edit from the current state of `node`.
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            kind: node.kind(),
            comment: node.comment.clone(),
            selected: node.selected,
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum EditError {
    #[snafu(display("Node name must not be empty"))]
    EmptyName,
    #[snafu(display("Node name '{}' is not a valid entry name", name))]
    InvalidName { name: String },
    #[snafu(display("Node {} does not exist", id))]
    NodeNotFound { id: NodeId },
}

fn find_mut(nodes: &mut [Node], id: NodeId) -> Option<&mut Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = node.children_mut().and_then(|children| find_mut(children, id)) {
            return Some(found);
        }
    }
    None
}

fn for_each_mut(nodes: &mut [Node], f: &mut impl FnMut(&mut Node)) {
    for node in nodes {
        f(node);
        if let Some(children) = node.children_mut() {
            for_each_mut(children, f);
        }
    }
}

fn remove(nodes: &mut Vec<Node>, id: NodeId) -> bool {
    let before = nodes.len();
    nodes.retain(|node| node.id != id);
    if nodes.len() != before {
        return true;
    }
    nodes
        .iter_mut()
        .filter_map(Node::children_mut)
        .any(|children| remove(children, id))
}

fn validate_name(name: &str) -> Result<String, EditError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditError::EmptyName);
    }
    // `#` would start a comment once the name is written back out as text.
    if name.contains(['/', '#']) || name == "." || name == ".." {
        return Err(EditError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

impl Forest {
    fn update(&self, id: NodeId, f: impl FnOnce(&mut Node)) -> Forest {
        let mut forest = self.clone();
        match find_mut(forest.roots_mut(), id) {
            Some(node) => f(node),
            None => debug!("Node {} not found, leaving forest unchanged", id),
        }
        forest
    }

    fn update_all(&self, mut f: impl FnMut(&mut Node)) -> Forest {
        let mut forest = self.clone();
        for_each_mut(forest.roots_mut(), &mut f);
        forest
    }

    pub fn toggle_expanded(&self, id: NodeId) -> Forest {
        self.update(id, |node| node.expanded = !node.expanded)
    }

    /// Sets the selection flag of exactly one node.
    pub fn set_selected(&self, id: NodeId, selected: bool) -> Forest {
        self.update(id, |node| node.selected = selected)
    }

    pub fn select_all(&self) -> Forest {
        self.update_all(|node| node.selected = true)
    }

    pub fn deselect_all(&self) -> Forest {
        self.update_all(|node| node.selected = false)
    }

    pub fn expand_all(&self) -> Forest {
        self.update_all(|node| node.expanded = true)
    }

    pub fn collapse_all(&self) -> Forest {
        self.update_all(|node| node.expanded = false)
    }

    /// Flips a node between file and directory. Children of a directory
    /// turned into a file are discarded.
    pub fn retype(&self, id: NodeId) -> Forest {
        self.update(id, |node| {
            let kind = match node.kind() {
                EntryKind::File => EntryKind::Directory,
                EntryKind::Directory => EntryKind::File,
            };
            debug!("Retyping '{}' to {}", node.name, kind);
            node.set_kind(kind);
        })
    }

    pub fn edit(&self, edit: &NodeEdit) -> Result<Forest, EditError> {
        let name = validate_name(&edit.name)?;
        if self.find(edit.id).is_none() {
            return Err(EditError::NodeNotFound { id: edit.id });
        }

        Ok(self.update(edit.id, |node| {
            node.name = name;
            node.set_kind(edit.kind);
            node.comment = edit
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|comment| !comment.is_empty())
                .map(str::to_string);
            node.selected = edit.selected;
        }))
    }

    /// Appends a new, empty root directory and returns its id.
    pub fn add_root(&self) -> (Forest, NodeId) {
        let mut forest = self.clone();
        let node = Node::directory(self.ids(), DEFAULT_NODE_NAME, 0);
        let id = node.id;
        forest.roots_mut().push(node);
        (forest, id)
    }

    /// Appends a new file under `parent`, promoting the parent to a directory
    /// first when it is a file. Returns `None` as id when the parent is
    /// missing.
    pub fn add_child(&self, parent: NodeId) -> (Forest, Option<NodeId>) {
        let mut forest = self.clone();
        let ids = self.ids().clone();
        let Some(node) = find_mut(forest.roots_mut(), parent) else {
            debug!("Parent {} not found, nothing added", parent);
            return (forest, None);
        };

        node.set_kind(EntryKind::Directory);
        let child = Node::file(&ids, DEFAULT_NODE_NAME, node.depth + 1);
        let id = child.id;
        if let Some(children) = node.children_mut() {
            children.push(child);
        }
        (forest, Some(id))
    }

    /// Removes the node and its whole subtree.
    pub fn delete(&self, id: NodeId) -> Forest {
        let mut forest = self.clone();
        if !remove(forest.roots_mut(), id) {
            debug!("Node {} not found, nothing deleted", id);
        }
        forest
    }
}
