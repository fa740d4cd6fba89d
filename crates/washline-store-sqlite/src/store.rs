//! [`SqliteKv`] — the SQLite implementation of [`KvStore`].

use std::{future::Future, path::Path};

use rusqlite::OptionalExtension as _;
use washline_core::kv::KvStore;

use crate::{Result, schema::SCHEMA};

/// A Washline key-value store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteKv {
  conn: tokio_rusqlite::Connection,
}

impl SqliteKv {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl KvStore for SqliteKv {
  type Error = crate::Error;

  fn get_raw<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>>> + Send + 'a {
    async move {
      let key = key.to_owned();
      let value: Option<String> = self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
              )
              .optional()?,
          )
        })
        .await?;
      Ok(value)
    }
  }

  fn put_raw<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    async move {
      let key = key.to_owned();
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
          )?;
          Ok(())
        })
        .await?;
      Ok(())
    }
  }

  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    async move {
      let key = key.to_owned();
      self
        .conn
        .call(move |conn| {
          conn
            .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
          Ok(())
        })
        .await?;
      Ok(())
    }
  }
}
