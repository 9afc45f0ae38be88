//! In-memory directory forest and the operations defined on it.
//!
//! Nodes are plain owned values: files carry no children, directories own
//! their children in order. Mutations never edit a forest in place, they
//! return an updated copy.

mod id;
mod mutator;
mod node;
mod paths;
mod render;
mod session;

pub use id::{IdGenerator, NodeId};
pub use mutator::{EditError, NodeEdit};
pub use node::{DEFAULT_NODE_NAME, EntryKind, Forest, Node, NodeBody, TreeStats, Walk};
pub use paths::{ExecutionItem, FILE_MARKER, flatten, serialize_to_text};
pub use render::render_tree;
pub use session::EditSession;
