//! The `KvStore` trait and the JSON encode/decode layer on top of it.
//!
//! The trait is implemented by storage backends (e.g.
//! `washline-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend. Each storage key holds one JSON-encoded value — a
//! whole collection or a single record — and writes always replace the whole
//! value.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

// ─── Storage keys ────────────────────────────────────────────────────────────

/// The persisted-state layout: one key per collection, plus the session key.
pub mod keys {
  pub const BAGS: &str = "washline_bags";
  pub const STUDENTS: &str = "washline_students";
  pub const STAFF: &str = "washline_staff";
  pub const ADMINS: &str = "washline_admins";
  /// Reserved for a store-wide audit feed; always initialised empty and
  /// unused by current operations.
  pub const AUDIT: &str = "washline_audit";
  pub const SESSION: &str = "washline_session";
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a persistent key-value backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait KvStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the raw serialised value for `key`, or `None` if absent.
  fn get_raw<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store the raw serialised value for `key`, replacing any prior value.
  fn put_raw<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key` entirely. Removing an absent key is not an error.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Typed access ────────────────────────────────────────────────────────────

/// Read and JSON-decode the value stored at `key`.
///
/// A value that fails to decode is treated as absent and yields `Ok(None)`.
/// A corrupted record must not take down the caller; availability wins over
/// correctness signalling here. Backend I/O errors still propagate.
pub async fn get_value<K, T>(kv: &K, key: &str) -> Result<Option<T>>
where
  K: KvStore,
  T: DeserializeOwned,
{
  let raw = kv.get_raw(key).await.map_err(Error::storage)?;
  Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
}

/// JSON-encode `value` and store it at `key`, replacing any prior value.
pub async fn set_value<K, T>(kv: &K, key: &str, value: &T) -> Result<()>
where
  K: KvStore,
  T: Serialize + ?Sized,
{
  let raw = serde_json::to_string(value)?;
  kv.put_raw(key, raw).await.map_err(Error::storage)
}

/// Remove the value stored at `key` — the "set to null" path.
pub async fn remove_value<K: KvStore>(kv: &K, key: &str) -> Result<()> {
  kv.remove(key).await.map_err(Error::storage)
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A `HashMap`-backed store — useful for testing, and the closest analogue
/// of a single isolated browser store.
///
/// Cloning is cheap — the inner map is reference-counted and shared.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
  inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
  pub fn new() -> Self { Self::default() }
}

impl KvStore for MemoryKv {
  type Error = Infallible;

  fn get_raw<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Infallible>> + Send + 'a {
    async move {
      let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
      Ok(map.get(key).cloned())
    }
  }

  fn put_raw<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Infallible>> + Send + 'a {
    async move {
      let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
      map.insert(key.to_owned(), value);
      Ok(())
    }
  }

  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Infallible>> + Send + 'a {
    async move {
      let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
      map.remove(key);
      Ok(())
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn get_value_missing_is_none() {
    let kv = MemoryKv::new();
    let got: Option<Vec<String>> = get_value(&kv, "nope").await.unwrap();
    assert!(got.is_none());
  }

  #[tokio::test]
  async fn set_then_get_round_trips() {
    let kv = MemoryKv::new();
    set_value(&kv, "k", &vec!["a".to_string(), "b".to_string()])
      .await
      .unwrap();
    let got: Option<Vec<String>> = get_value(&kv, "k").await.unwrap();
    assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));
  }

  #[tokio::test]
  async fn corrupt_value_degrades_to_none() {
    let kv = MemoryKv::new();
    kv.put_raw("k", "{not json".to_string()).await.unwrap();
    let got: Option<Vec<String>> = get_value(&kv, "k").await.unwrap();
    assert!(got.is_none());
  }

  #[tokio::test]
  async fn remove_clears_the_key() {
    let kv = MemoryKv::new();
    set_value(&kv, "k", &1u32).await.unwrap();
    remove_value(&kv, "k").await.unwrap();
    let got: Option<u32> = get_value(&kv, "k").await.unwrap();
    assert!(got.is_none());
  }
}
