#[allow(clippy::module_inception)]
mod cli;

pub use cli::{ApplyArgs, Cli, Command};
