//! Loom Pipeline — the thin coordinator (spec §2) that sequences the language
//! registry (C1), the extractor (C2), the two-pass resolver (C3), and the
//! graph store (C4) into `parseProject`, `parseFile`, and `deleteFile`.

pub mod coordinator;
pub mod walk;

pub use coordinator::Pipeline;
pub use walk::enumerate_files;
