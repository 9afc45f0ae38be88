use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::Display;
use serde::Serialize;

/// Opaque identity of a node inside a forest.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[display("#{_0}")]
pub struct NodeId(u64);

/// Id space reserved for each generator lineage.
const LINEAGE_BITS: u32 = 32;

static NEXT_LINEAGE: AtomicU64 = AtomicU64::new(0);

/// Hands out node ids.
///
/// Clones share the same counter, so every forest derived from another one
/// (through parsing or mutation) keeps allocating ids that were never seen
/// before. Independent generators start in disjoint ranges, so ids stay
/// unique across the whole process.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: Arc<AtomicU64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        let lineage = NEXT_LINEAGE.fetch_add(1, Ordering::Relaxed);
        Self {
            next: Arc::new(AtomicU64::new(lineage << LINEAGE_BITS)),
        }
    }

    pub fn next_id(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
