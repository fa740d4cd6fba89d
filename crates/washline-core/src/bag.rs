//! Bag types — one physical laundry bag's lifecycle record.
//!
//! A bag carries two append-only logs: `audit` (human-readable, newest
//! first) and `count_history` (machine-readable, oldest first). Every stage
//! change appears in both; they are kept as two logical views so the
//! persisted JSON shape stays stable.
//!
//! All records serialise with camelCase field names and RFC 3339 timestamps,
//! matching the stored-collection layout exactly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Stage ───────────────────────────────────────────────────────────────────

/// One of the five statuses a bag can occupy, in lifecycle order.
///
/// The order is a convention, not a constraint: `record_stage` performs no
/// adjacency check, so callers may move a bag to any stage. Which
/// transitions are offered is a caller-side concern.
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
pub enum Stage {
  Dropped,
  Washing,
  Drying,
  #[serde(rename = "Ready for Pickup")]
  #[strum(serialize = "Ready for Pickup")]
  ReadyForPickup,
  #[serde(rename = "Picked Up")]
  #[strum(serialize = "Picked Up")]
  PickedUp,
}

impl Stage {
  /// All stages in lifecycle order.
  pub const ALL: [Stage; 5] = [
    Stage::Dropped,
    Stage::Washing,
    Stage::Drying,
    Stage::ReadyForPickup,
    Stage::PickedUp,
  ];
}

// ─── Log entries ─────────────────────────────────────────────────────────────

/// One entry in a bag's count history: the clothes count verified at a
/// stage transition. The first entry is always `Dropped` at the declared
/// count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountEntry {
  pub stage:     Stage,
  pub count:     u32,
  pub timestamp: DateTime<Utc>,
}

/// A human-readable audit line: what happened, who did it, when, and
/// optional free-text detail. Audit sequences are newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
  pub action:    String,
  pub by:        String,
  pub timestamp: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details:   Option<String>,
}

// ─── Bag ─────────────────────────────────────────────────────────────────────

/// One tracked laundry unit. The student fields are a snapshot taken at
/// drop-off time, not re-joined live against the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bag {
  pub bag_id:        String,
  pub student_roll:  String,
  pub student_name:  String,
  pub hostel_block:  String,
  pub room:          String,
  pub contact:       String,

  /// Repository-assigned at creation; immutable thereafter.
  pub dropoff_timestamp:     DateTime<Utc>,
  /// Fixed at creation: drop-off + 5 days.
  pub estimated_pickup_date: NaiveDate,

  pub status:         Stage,
  pub declared_count: u32,
  pub count_history:  Vec<CountEntry>,

  #[serde(default)]
  pub assigned_staff_id: Option<String>,
  #[serde(default)]
  pub pickup_timestamp:  Option<DateTime<Utc>>,

  #[serde(default)]
  pub audit: Vec<AuditEntry>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::repo::BagRepository::create`]. Timestamps and the
/// initial log entries are synthesised by the repository; they are not
/// accepted from callers.
#[derive(Debug, Clone)]
pub struct NewBag {
  pub bag_id:         String,
  pub student_roll:   String,
  pub student_name:   String,
  pub hostel_block:   String,
  pub room:           String,
  pub contact:        String,
  pub declared_count: u32,
}

/// A shallow-merge patch for [`crate::repo::BagRepository::update`]: only
/// the set fields are applied onto the stored record.
#[derive(Debug, Clone, Default)]
pub struct BagPatch {
  pub status:            Option<Stage>,
  pub assigned_staff_id: Option<String>,
  pub pickup_timestamp:  Option<DateTime<Utc>>,
  pub count_history:     Option<Vec<CountEntry>>,
}

impl BagPatch {
  pub(crate) fn apply(self, bag: &mut Bag) {
    if let Some(status) = self.status {
      bag.status = status;
    }
    if let Some(staff_id) = self.assigned_staff_id {
      bag.assigned_staff_id = Some(staff_id);
    }
    if let Some(ts) = self.pickup_timestamp {
      bag.pickup_timestamp = Some(ts);
    }
    if let Some(history) = self.count_history {
      bag.count_history = history;
    }
  }
}

/// Input to [`crate::repo::BagRepository::append_audit`]. The timestamp
/// defaults to now when not supplied.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
  pub action:    String,
  pub by:        String,
  pub details:   Option<String>,
  pub timestamp: Option<DateTime<Utc>>,
}

// ─── Id generation ───────────────────────────────────────────────────────────

/// Generate a `BAG-XXXXXXXX` id for callers that don't scan one.
pub fn generate_bag_id() -> String {
  let raw = Uuid::new_v4().simple().to_string();
  format!("BAG-{}", raw[..8].to_uppercase())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
