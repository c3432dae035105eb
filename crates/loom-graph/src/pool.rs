//! A small pool of SQLite connections (spec §5 "a shared pool of store
//! connections"). `rusqlite::Connection` is `Send` but not safely shared across
//! threads without external synchronization, so each slot gets its own mutex —
//! the same thread-confined-resource shape as `loom_lang::ParserPool`, just with a
//! lock instead of a dedicated worker thread, since SQLite itself already
//! serializes concurrent writers to one file.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::schema::ensure_schema;

pub struct ConnectionPool {
    slots: Vec<Arc<Mutex<Connection>>>,
    next: AtomicUsize,
}

impl ConnectionPool {
    pub fn open(path: &Path, size: usize) -> rusqlite::Result<Self> {
        let size = size.max(1);
        let mut slots = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open(path)?;
            ensure_schema(&conn)?;
            slots.push(Arc::new(Mutex::new(conn)));
        }
        Ok(ConnectionPool { slots, next: AtomicUsize::new(0) })
    }

    pub fn open_in_memory(size: usize) -> rusqlite::Result<Self> {
        let size = size.max(1);
        // A single shared in-memory database requires a named, shared-cache
        // connection: a plain `:memory:` per slot would give each slot its own
        // empty database.
        let mut slots = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open("file::memory:?cache=shared")?;
            conn.execute_batch("PRAGMA cache=shared;")?;
            ensure_schema(&conn)?;
            slots.push(Arc::new(Mutex::new(conn)));
        }
        Ok(ConnectionPool { slots, next: AtomicUsize::new(0) })
    }

    /// Round-robin slot selection; the returned guard holds the slot's lock for
    /// the duration of the caller's transaction.
    pub fn acquire(&self) -> Arc<Mutex<Connection>> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        Arc::clone(&self.slots[idx])
    }
}
