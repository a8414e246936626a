//! Decision rules: which files qualify for conversion or listing.

mod discovery;
mod selector;

pub use discovery::{discover, DiscoveryMatch};
pub use selector::{select_track, Selection, SelectionPolicy, SkipReason};
