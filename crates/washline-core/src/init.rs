//! Default-data initializer.
//!
//! Idempotent: each collection key that is absent (or unreadable) is seeded
//! with an empty collection; the admins collection gets the default
//! credential. Safe to call arbitrarily many times — existing readable data
//! is never touched.

use serde::Serialize;
use serde_json::Value;

use crate::{
  Result,
  bag::Bag,
  directory::{Admin, Staff, Student},
  kv::{self, KvStore, keys},
};

async fn seed_if_absent<K, T>(kv: &K, key: &str, default: &T) -> Result<()>
where
  K: KvStore,
  T: Serialize + ?Sized,
{
  // An unreadable value counts as absent and is reseeded; see the decode
  // policy on `kv::get_value`.
  if kv::get_value::<K, Value>(kv, key).await?.is_none() {
    kv::set_value(kv, key, default).await?;
  }
  Ok(())
}

/// Seed all collections. Called defensively at every entry point.
pub async fn init_defaults<K: KvStore>(kv: &K) -> Result<()> {
  seed_if_absent(kv, keys::BAGS, &Vec::<Bag>::new()).await?;
  seed_if_absent(kv, keys::STUDENTS, &Vec::<Student>::new()).await?;
  seed_if_absent(kv, keys::STAFF, &Vec::<Staff>::new()).await?;
  seed_if_absent(kv, keys::ADMINS, &vec![Admin::default_record()]).await?;
  // Reserved store-wide audit feed; unused by current operations.
  seed_if_absent(kv, keys::AUDIT, &Vec::<Value>::new()).await?;
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::kv::MemoryKv;

  #[tokio::test]
  async fn seeds_empty_collections_and_default_admin() {
    let kv = MemoryKv::new();
    init_defaults(&kv).await.unwrap();

    let bags: Vec<Bag> = kv::get_value(&kv, keys::BAGS).await.unwrap().unwrap();
    assert!(bags.is_empty());

    let admins: Vec<Admin> =
      kv::get_value(&kv, keys::ADMINS).await.unwrap().unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, "admin");
    assert_eq!(admins[0].password, "admin123");

    let audit: Vec<Value> =
      kv::get_value(&kv, keys::AUDIT).await.unwrap().unwrap();
    assert!(audit.is_empty());
  }

  #[tokio::test]
  async fn does_not_clobber_existing_data() {
    let kv = MemoryKv::new();
    kv::set_value(&kv, keys::ADMINS, &vec![Admin {
      username:     "root".into(),
      password:     "hunter2".into(),
      display_name: "Root".into(),
    }])
    .await
    .unwrap();

    init_defaults(&kv).await.unwrap();
    init_defaults(&kv).await.unwrap();

    let admins: Vec<Admin> =
      kv::get_value(&kv, keys::ADMINS).await.unwrap().unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, "root");
  }

  #[tokio::test]
  async fn reseeds_over_a_corrupt_value() {
    let kv = MemoryKv::new();
    kv.put_raw(keys::BAGS, "not json at all".into()).await.unwrap();

    init_defaults(&kv).await.unwrap();
    let bags: Vec<Bag> = kv::get_value(&kv, keys::BAGS).await.unwrap().unwrap();
    assert!(bags.is_empty());
  }
}
