//! Loom Graph — the Graph Upsert Layer (spec §4.4): idempotent SQLite-backed
//! storage for entities and edges, with deterministic identity keys, cascade
//! delete, and the read-side query contracts (§6) downstream consumers need.
//!
//! SQLite stands in for the "external property-graph store" the spec describes
//! (§1 "Out of scope" excludes the specific store product; this crate implements
//! only the C4 contract against it). Node/edge payloads round-trip as JSON so the
//! store never needs its own copy of the entity/edge schema.

pub mod pool;
pub mod schema;
pub mod store;

pub use pool::ConnectionPool;
pub use schema::ensure_schema;
pub use store::{FileSubgraph, GraphStats, GraphStore, SearchHit};
