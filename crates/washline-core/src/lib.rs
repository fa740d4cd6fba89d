//! Core types and trait definitions for the Washline laundry tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod bag;
pub mod directory;
pub mod error;
pub mod init;
pub mod kv;
pub mod repo;
pub mod session;

pub use error::{Error, Result};
