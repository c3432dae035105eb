//! Loom Watcher — the out-of-scope filesystem-watcher collaborator (spec §6),
//! reduced to mapping debounced `add|change|unlink` events onto
//! `Pipeline::parse_file`/`delete_file`.

pub mod watcher;

pub use watcher::{WatchEvent, WatchEventKind, WatcherService};
