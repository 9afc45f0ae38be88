//! Structure text parsing.
//!
//! Accepts the output of `tree` (Unicode or ASCII connectors) as well as
//! plainly indented listings, mixed freely. A trailing `/` marks a
//! directory, a trailing `**` marks a file, and `#` starts a comment.

mod line;
#[allow(clippy::module_inception)]
mod parser;

pub use parser::{Parser, parse};
