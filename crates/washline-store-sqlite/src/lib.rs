//! SQLite backend for the Washline key-value store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The whole store is a single
//! `kv` table — one row per collection key, one JSON document per row —
//! which keeps the persisted layout identical to the original single-slot
//! scheme.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteKv;
