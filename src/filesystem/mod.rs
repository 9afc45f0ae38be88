//! Read-only view of the real filesystem, used to pick a target directory.

mod listing;

pub use listing::{DirectoryListing, ListingEntry, ListingError, list_directory};
