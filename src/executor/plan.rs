use serde::Serialize;

use crate::tree::{EntryKind, ExecutionItem};

/// Execution items in the order they are applied: every directory first,
/// then every file, each group in its original order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    items: Vec<ExecutionItem>,
    #[serde(skip)]
    directories: usize,
}

pub fn plan(items: impl IntoIterator<Item = ExecutionItem>) -> Plan {
    let mut items = items.into_iter().collect::<Vec<_>>();
    // `sort_by_key` is stable, which keeps the relative order within a kind.
    items.sort_by_key(|item| match item.kind {
        EntryKind::Directory => 0,
        EntryKind::File => 1,
    });
    let directories = items
        .iter()
        .take_while(|item| item.kind == EntryKind::Directory)
        .count();
    Plan { items, directories }
}

impl Plan {
    pub fn items(&self) -> &[ExecutionItem] {
        &self.items
    }

    pub fn directories(&self) -> &[ExecutionItem] {
        &self.items[..self.directories]
    }

    pub fn files(&self) -> &[ExecutionItem] {
        &self.items[self.directories..]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
