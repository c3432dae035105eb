//! Loom Resolve — the two-pass cross-file resolver (spec §4.3): Pass A builds the
//! Symbol Registry (`registry`), Pass B (`resolve`) rewrites each file's
//! unresolved references into edge records whose endpoints are graph identities.
//!
//! Pass B is a pure function of the combined entity set and the Pass A registry:
//! it never mutates the registry and never reorders files, which is what makes
//! resolution order-independent (spec "Guarantees").

pub mod registry;
pub mod resolve;

pub use registry::SymbolRegistry;
pub use resolve::{resolve, ResolutionOutput};
