//! Session holder — the single "who is currently operating this store"
//! record.
//!
//! There is exactly one session slot. Login overwrites it unconditionally,
//! logout removes it, and `current` trusts whatever is stored — no expiry,
//! no signature. The holder is passed around as explicit context; the
//! repository layer never reads it.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  kv::{self, KvStore, keys},
};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Student,
  Staff,
  Admin,
}

/// The stored session record: role plus the operator's id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub role: Role,
  pub id:   String,
  pub name: String,
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionStore<K> {
  kv: K,
}

impl<K: KvStore> SessionStore<K> {
  pub fn new(kv: K) -> Self { Self { kv } }

  /// Overwrite the session record unconditionally.
  pub async fn login(
    &self,
    role: Role,
    id: impl Into<String>,
    name: impl Into<String>,
  ) -> Result<Session> {
    let id = id.into();
    if id.trim().is_empty() {
      return Err(Error::InvalidArgument("session id is required".into()));
    }

    let session = Session { role, id, name: name.into() };
    kv::set_value(&self.kv, keys::SESSION, &session).await?;
    Ok(session)
  }

  /// Remove the session record.
  pub async fn logout(&self) -> Result<()> {
    kv::remove_value(&self.kv, keys::SESSION).await
  }

  /// The stored session, or `None` when absent or unreadable.
  pub async fn current(&self) -> Result<Option<Session>> {
    kv::get_value(&self.kv, keys::SESSION).await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
