use tracing::debug;

use crate::parser::Parser;
use crate::tree::{EditError, Forest, Node, NodeEdit, NodeId};

/// A single editing session: the current forest plus the node, if any, that
/// is open for editing.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    forest: Forest,
    editing: Option<NodeId>,
}

impl EditSession {
    pub fn new(forest: Forest) -> Self {
        Self {
            forest,
            editing: None,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn into_forest(self) -> Forest {
        self.forest
    }

    /// The node currently open for editing.
    pub fn editing(&self) -> Option<&Node> {
        self.editing.and_then(|id| self.forest.find(id))
    }

    /// Replaces the forest with a fresh parse of `text`.
    pub fn load(&mut self, text: &str) {
        self.forest = Parser::new(self.forest.ids().clone()).parse(text);
        self.editing = None;
    }

    /// Opens `id` for editing; unknown ids clear the edit selection.
    pub fn begin_edit(&mut self, id: Option<NodeId>) {
        self.editing = id.filter(|id| self.forest.find(*id).is_some());
    }

    pub fn apply_edit(&mut self, edit: &NodeEdit) -> Result<(), EditError> {
        self.forest = self.forest.edit(edit)?;
        self.editing = None;
        Ok(())
    }

    pub fn delete(&mut self, id: NodeId) {
        self.forest = self.forest.delete(id);
        if self.editing == Some(id) {
            debug!("Deleted node {} was open for editing", id);
            self.editing = None;
        }
    }

    /// Adds a root directory and opens it for editing.
    pub fn add_root(&mut self) -> NodeId {
        let (forest, id) = self.forest.add_root();
        self.forest = forest;
        self.editing = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId) -> Option<NodeId> {
        let (forest, id) = self.forest.add_child(parent);
        self.forest = forest;
        id
    }

    pub fn modify(&mut self, f: impl FnOnce(&Forest) -> Forest) {
        self.forest = f(&self.forest);
    }
}
