//! [`BagRepository`] — CRUD and lifecycle bookkeeping over the stored bag
//! collection.
//!
//! Every operation that reads-then-writes does so as a single in-memory
//! round trip: read the whole collection, mutate the copy, write the whole
//! collection back. There are no partial-record updates at the storage
//! level, and no locking — the store targets a single active writer.

use chrono::{Days, Utc};

use crate::{
  Error, Result,
  bag::{AuditEntry, Bag, BagPatch, CountEntry, NewAuditEntry, NewBag, Stage},
  kv::{self, KvStore, keys},
};

/// How far out the estimated pickup date is set at drop-off.
const PICKUP_ESTIMATE_DAYS: u64 = 5;

// ─── Repository ──────────────────────────────────────────────────────────────

/// The bag collection's repository, generic over any [`KvStore`] backend.
///
/// Cloning is as cheap as cloning the backend handle.
#[derive(Debug, Clone)]
pub struct BagRepository<K> {
  kv: K,
}

impl<K: KvStore> BagRepository<K> {
  pub fn new(kv: K) -> Self { Self { kv } }

  // ── Collection round trip ─────────────────────────────────────────────

  /// Return the full stored collection, or empty if the key is absent or
  /// the stored value fails to decode. Never a domain error.
  pub async fn list(&self) -> Result<Vec<Bag>> {
    Ok(
      kv::get_value(&self.kv, keys::BAGS)
        .await?
        .unwrap_or_default(),
    )
  }

  async fn save(&self, bags: &[Bag]) -> Result<()> {
    kv::set_value(&self.kv, keys::BAGS, bags).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get_by_id(&self, id: &str) -> Result<Bag> {
    if id.trim().is_empty() {
      return Err(Error::InvalidArgument("bag id is required".into()));
    }

    self
      .list()
      .await?
      .into_iter()
      .find(|b| b.bag_id == id)
      .ok_or_else(|| Error::NotFound(id.to_owned()))
  }

  // ── Create ────────────────────────────────────────────────────────────

  /// Create a bag at drop-off. Synthesises the initial `Dropped` audit
  /// entry and count-history entry, and prepends the bag so the collection
  /// stays most-recent-first (a convention, not an invariant enforced on
  /// read).
  pub async fn create(&self, input: NewBag) -> Result<Bag> {
    if input.bag_id.trim().is_empty() {
      return Err(Error::Validation("bagId is required".into()));
    }
    if input.student_roll.trim().is_empty() {
      return Err(Error::Validation("studentRoll is required".into()));
    }
    if input.declared_count < 1 {
      return Err(Error::Validation(
        "declaredCount must be a positive integer".into(),
      ));
    }

    let mut bags = self.list().await?;
    if bags.iter().any(|b| b.bag_id == input.bag_id) {
      return Err(Error::Conflict(input.bag_id));
    }

    let now = Utc::now();
    let bag = Bag {
      dropoff_timestamp:     now,
      estimated_pickup_date: (now + Days::new(PICKUP_ESTIMATE_DAYS))
        .date_naive(),
      status:                Stage::Dropped,
      audit:                 vec![AuditEntry {
        action:    Stage::Dropped.to_string(),
        by:        format!("student:{}", input.student_roll),
        timestamp: now,
        details:   Some(format!("Declared count {}", input.declared_count)),
      }],
      count_history:         vec![CountEntry {
        stage:     Stage::Dropped,
        count:     input.declared_count,
        timestamp: now,
      }],
      assigned_staff_id:     None,
      pickup_timestamp:      None,
      bag_id:                input.bag_id,
      student_roll:          input.student_roll,
      student_name:          input.student_name,
      hostel_block:          input.hostel_block,
      room:                  input.room,
      contact:               input.contact,
      declared_count:        input.declared_count,
    };

    bags.insert(0, bag.clone());
    self.save(&bags).await?;
    Ok(bag)
  }

  // ── Update ────────────────────────────────────────────────────────────

  /// Shallow-merge `patch` onto the stored record and persist the whole
  /// collection.
  pub async fn update(&self, id: &str, patch: BagPatch) -> Result<Bag> {
    if id.trim().is_empty() {
      return Err(Error::InvalidArgument("bag id is required".into()));
    }

    let mut bags = self.list().await?;
    let bag = bags
      .iter_mut()
      .find(|b| b.bag_id == id)
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;

    patch.apply(bag);
    let updated = bag.clone();
    self.save(&bags).await?;
    Ok(updated)
  }

  // ── Audit ─────────────────────────────────────────────────────────────

  /// Prepend an audit entry (newest first). The timestamp defaults to now
  /// when the entry doesn't provide one.
  pub async fn append_audit(
    &self,
    id: &str,
    entry: NewAuditEntry,
  ) -> Result<Bag> {
    if id.trim().is_empty() {
      return Err(Error::InvalidArgument("bag id is required".into()));
    }
    if entry.action.trim().is_empty() {
      return Err(Error::InvalidArgument(
        "audit entry must have an action".into(),
      ));
    }

    let mut bags = self.list().await?;
    let bag = bags
      .iter_mut()
      .find(|b| b.bag_id == id)
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;

    bag.audit.insert(0, AuditEntry {
      action:    entry.action,
      by:        entry.by,
      timestamp: entry.timestamp.unwrap_or_else(Utc::now),
      details:   entry.details,
    });

    let updated = bag.clone();
    self.save(&bags).await?;
    Ok(updated)
  }

  // ── Assignment ────────────────────────────────────────────────────────

  /// Claim a bag for a staff member.
  ///
  /// No already-assigned guard exists at this level: a second call simply
  /// overwrites the prior assignment. Callers that want first-claim-wins
  /// must check `assigned_staff_id` before offering the action.
  pub async fn assign(&self, id: &str, staff_id: &str) -> Result<Bag> {
    if id.trim().is_empty() {
      return Err(Error::InvalidArgument("bag id is required".into()));
    }
    if staff_id.trim().is_empty() {
      return Err(Error::InvalidArgument("staff id is required".into()));
    }

    self
      .update(id, BagPatch {
        assigned_staff_id: Some(staff_id.to_owned()),
        ..BagPatch::default()
      })
      .await?;

    self
      .append_audit(id, NewAuditEntry {
        action:    "Assigned".into(),
        by:        staff_id.to_owned(),
        details:   Some(format!("Assigned to {staff_id}")),
        timestamp: None,
      })
      .await
  }

  // ── Stage transition ──────────────────────────────────────────────────

  /// The sole state-transition operation: record a verified count for
  /// `stage`, move the bag's status there, and log a matching audit entry.
  ///
  /// Performs no adjacency check — a bag may jump from any stage to any
  /// other. A count that disagrees with `declared_count` is stored as-is;
  /// surfacing the discrepancy is a caller concern.
  pub async fn record_stage(
    &self,
    id: &str,
    stage: Stage,
    staff_id: &str,
    count: u32,
  ) -> Result<Bag> {
    if id.trim().is_empty() {
      return Err(Error::InvalidArgument("bag id is required".into()));
    }
    if staff_id.trim().is_empty() {
      return Err(Error::InvalidArgument("staff id is required".into()));
    }

    let bag = self.get_by_id(id).await?;
    let now = Utc::now();

    let mut history = bag.count_history;
    history.push(CountEntry { stage, count, timestamp: now });

    self
      .update(id, BagPatch {
        status: Some(stage),
        count_history: Some(history),
        ..BagPatch::default()
      })
      .await?;

    self
      .append_audit(id, NewAuditEntry {
        action:    stage.to_string(),
        by:        staff_id.to_owned(),
        details:   Some(format!("count={count}")),
        timestamp: Some(now),
      })
      .await
  }

  // ── Pickup ────────────────────────────────────────────────────────────

  /// The student pickup confirmation: terminal status plus the pickup
  /// timestamp, via a plain patch. No audit entry is written.
  pub async fn confirm_pickup(&self, id: &str) -> Result<Bag> {
    self
      .update(id, BagPatch {
        status: Some(Stage::PickedUp),
        pickup_timestamp: Some(Utc::now()),
        ..BagPatch::default()
      })
      .await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::kv::MemoryKv;

  fn repo() -> BagRepository<MemoryKv> { BagRepository::new(MemoryKv::new()) }

  fn new_bag(id: &str, count: u32) -> NewBag {
    NewBag {
      bag_id:         id.into(),
      student_roll:   "21CS042".into(),
      student_name:   "Asha".into(),
      hostel_block:   "B".into(),
      room:           "214".into(),
      contact:        "9900000000".into(),
      declared_count: count,
    }
  }

  // ── Create ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_get_returns_equal_record() {
    let r = repo();
    let created = r.create(new_bag("BAG-001", 12)).await.unwrap();
    let fetched = r.get_by_id("BAG-001").await.unwrap();

    assert_eq!(fetched.bag_id, created.bag_id);
    assert_eq!(fetched.student_roll, "21CS042");
    assert_eq!(fetched.status, Stage::Dropped);
    assert_eq!(fetched.declared_count, 12);
    assert_eq!(fetched.dropoff_timestamp, created.dropoff_timestamp);
  }

  #[tokio::test]
  async fn create_synthesises_initial_logs() {
    let r = repo();
    let bag = r.create(new_bag("BAG-001", 12)).await.unwrap();

    assert_eq!(bag.count_history.len(), 1);
    assert_eq!(bag.count_history[0].stage, Stage::Dropped);
    assert_eq!(bag.count_history[0].count, 12);
    assert_eq!(bag.count_history[0].timestamp, bag.dropoff_timestamp);

    assert_eq!(bag.audit.len(), 1);
    assert_eq!(bag.audit[0].action, "Dropped");
    assert_eq!(bag.audit[0].by, "student:21CS042");
    assert_eq!(bag.audit[0].details.as_deref(), Some("Declared count 12"));
  }

  #[tokio::test]
  async fn create_sets_pickup_estimate_five_days_out() {
    let r = repo();
    let bag = r.create(new_bag("BAG-001", 1)).await.unwrap();
    assert_eq!(
      bag.estimated_pickup_date,
      (bag.dropoff_timestamp + Days::new(5)).date_naive()
    );
  }

  #[tokio::test]
  async fn create_duplicate_id_conflicts_and_leaves_collection_unchanged() {
    let r = repo();
    r.create(new_bag("BAG-001", 3)).await.unwrap();

    let before = r.list().await.unwrap();
    let err = r.create(new_bag("BAG-001", 5)).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(id) if id == "BAG-001"));

    let after = r.list().await.unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0].declared_count, 3);
  }

  #[tokio::test]
  async fn create_rejects_zero_count_and_blank_fields() {
    let r = repo();

    let err = r.create(new_bag("BAG-001", 0)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("declaredCount")));

    let err = r.create(new_bag("", 1)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("bagId")));

    let mut input = new_bag("BAG-002", 1);
    input.student_roll = "  ".into();
    let err = r.create(input).await.unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("studentRoll")));

    // count = 1 is the smallest accepted value
    r.create(new_bag("BAG-003", 1)).await.unwrap();
  }

  #[tokio::test]
  async fn create_prepends_most_recent_first() {
    let r = repo();
    r.create(new_bag("BAG-001", 1)).await.unwrap();
    r.create(new_bag("BAG-002", 1)).await.unwrap();

    let bags = r.list().await.unwrap();
    assert_eq!(bags[0].bag_id, "BAG-002");
    assert_eq!(bags[1].bag_id, "BAG-001");
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_by_id_empty_and_missing() {
    let r = repo();
    assert!(matches!(
      r.get_by_id("").await.unwrap_err(),
      Error::InvalidArgument(_)
    ));
    assert!(matches!(
      r.get_by_id("BAG-404").await.unwrap_err(),
      Error::NotFound(id) if id == "BAG-404"
    ));
  }

  #[tokio::test]
  async fn list_on_corrupt_value_is_empty() {
    let kv = MemoryKv::new();
    kv.put_raw(keys::BAGS, "][ definitely not json".into())
      .await
      .unwrap();

    let r = BagRepository::new(kv);
    assert!(r.list().await.unwrap().is_empty());
  }

  // ── Update / audit ────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_merges_only_set_fields() {
    let r = repo();
    r.create(new_bag("BAG-001", 4)).await.unwrap();

    let updated = r
      .update("BAG-001", BagPatch {
        status: Some(Stage::Washing),
        ..BagPatch::default()
      })
      .await
      .unwrap();

    assert_eq!(updated.status, Stage::Washing);
    assert_eq!(updated.declared_count, 4);
    assert!(updated.assigned_staff_id.is_none());
  }

  #[tokio::test]
  async fn update_missing_bag_is_not_found() {
    let r = repo();
    let err = r.update("BAG-404", BagPatch::default()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[tokio::test]
  async fn append_audit_prepends_and_defaults_timestamp() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();

    let bag = r
      .append_audit("BAG-001", NewAuditEntry {
        action:    "Inspected".into(),
        by:        "staff-1".into(),
        details:   None,
        timestamp: None,
      })
      .await
      .unwrap();

    assert_eq!(bag.audit.len(), 2);
    assert_eq!(bag.audit[0].action, "Inspected");
    // The synthesised Dropped entry is now second.
    assert_eq!(bag.audit[1].action, "Dropped");
  }

  #[tokio::test]
  async fn append_audit_requires_an_action() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();

    let err = r
      .append_audit("BAG-001", NewAuditEntry {
        action:    "".into(),
        by:        "staff-1".into(),
        details:   None,
        timestamp: None,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  // ── Assignment ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn assign_sets_staff_and_logs_audit() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();

    let bag = r.assign("BAG-001", "staff-1").await.unwrap();
    assert_eq!(bag.assigned_staff_id.as_deref(), Some("staff-1"));
    assert_eq!(bag.audit[0].action, "Assigned");
    assert_eq!(bag.audit[0].by, "staff-1");
    assert_eq!(bag.audit[0].details.as_deref(), Some("Assigned to staff-1"));
  }

  #[tokio::test]
  async fn assign_twice_is_last_write_wins() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();

    r.assign("BAG-001", "staff-2").await.unwrap();
    let bag = r.assign("BAG-001", "staff-3").await.unwrap();
    assert_eq!(bag.assigned_staff_id.as_deref(), Some("staff-3"));
  }

  #[tokio::test]
  async fn assign_rejects_empty_arguments() {
    let r = repo();
    assert!(matches!(
      r.assign("", "staff-1").await.unwrap_err(),
      Error::InvalidArgument(_)
    ));
    assert!(matches!(
      r.assign("BAG-001", " ").await.unwrap_err(),
      Error::InvalidArgument(_)
    ));
  }

  // ── Stage transitions ─────────────────────────────────────────────────

  #[tokio::test]
  async fn record_stage_updates_status_history_and_audit() {
    let r = repo();
    r.create(new_bag("BAG-001", 12)).await.unwrap();

    r.record_stage("BAG-001", Stage::Washing, "staff-1", 10)
      .await
      .unwrap();

    let bag = r.get_by_id("BAG-001").await.unwrap();
    assert_eq!(bag.status, Stage::Washing);
    assert_eq!(bag.count_history.len(), 2);
    assert_eq!(bag.count_history[1].stage, Stage::Washing);
    assert_eq!(bag.count_history[1].count, 10);
    assert_eq!(bag.audit[0].action, "Washing");
    assert_eq!(bag.audit[0].by, "staff-1");
    assert_eq!(bag.audit[0].details.as_deref(), Some("count=10"));
    assert_eq!(bag.audit[0].timestamp, bag.count_history[1].timestamp);
  }

  #[tokio::test]
  async fn record_stage_has_no_adjacency_check() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();

    // Dropped straight to Ready for Pickup.
    let bag = r
      .record_stage("BAG-001", Stage::ReadyForPickup, "staff-1", 2)
      .await
      .unwrap();
    assert_eq!(bag.status, Stage::ReadyForPickup);
  }

  #[tokio::test]
  async fn record_stage_failures_leave_bag_unchanged() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();
    let before = r.get_by_id("BAG-001").await.unwrap();

    let err = r
      .record_stage("BAG-001", Stage::Washing, "", 2)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = r
      .record_stage("BAG-404", Stage::Washing, "staff-1", 2)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let after = r.get_by_id("BAG-001").await.unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.count_history.len(), before.count_history.len());
    assert_eq!(after.audit.len(), before.audit.len());
  }

  #[tokio::test]
  async fn discrepancy_with_declared_count_is_stored_not_flagged() {
    // Declared 12, staff verifies 11 at Washing.
    let r = repo();
    r.create(new_bag("BAG-001", 12)).await.unwrap();

    let bag = r
      .record_stage("BAG-001", Stage::Washing, "staff-1", 11)
      .await
      .unwrap();
    assert_eq!(bag.declared_count, 12);
    assert_eq!(bag.count_history[1].count, 11);
  }

  // ── Pickup ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn confirm_pickup_sets_terminal_status_and_timestamp() {
    let r = repo();
    r.create(new_bag("BAG-001", 2)).await.unwrap();

    let bag = r.confirm_pickup("BAG-001").await.unwrap();
    assert_eq!(bag.status, Stage::PickedUp);
    assert!(bag.pickup_timestamp.is_some());
    // Pickup goes through the plain update path; no audit entry.
    assert_eq!(bag.audit.len(), 1);
  }
}
