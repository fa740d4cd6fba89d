//! Handlers for `/bags` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/bags` | Optional `?studentRoll=&status=&assignedStaffId=` |
//! | `POST`  | `/bags` | Body: [`CreateBagBody`]; 201 + stored bag |
//! | `GET`   | `/bags/:id` | 404 if not found |
//! | `PATCH` | `/bags/:id` | Body: [`UpdateBagBody`] (shallow merge) |
//! | `POST`  | `/bags/:id/assign` | Body: `{"staffId":"..."}` |
//! | `POST`  | `/bags/:id/stage` | Body: [`RecordStageBody`] |
//! | `POST`  | `/bags/:id/pickup` | Student pickup confirmation |
//! | `POST`  | `/bags/:id/audit` | Body: [`AuditBody`] |
//!
//! Dashboards poll these endpoints on an interval and re-read fully; there
//! is no push channel and no incremental diff.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use washline_core::{
  bag::{
    Bag, BagPatch, CountEntry, NewAuditEntry, NewBag, Stage, generate_bag_id,
  },
  kv::KvStore,
};

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub student_roll:      Option<String>,
  pub status:            Option<Stage>,
  pub assigned_staff_id: Option<String>,
}

/// `GET /bags[?studentRoll=...][&status=...][&assignedStaffId=...]`
pub async fn list<K: KvStore>(
  State(state): State<AppState<K>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Bag>>, ApiError> {
  let mut bags = state.repo.list().await?;

  if let Some(roll) = &params.student_roll {
    bags.retain(|b| &b.student_roll == roll);
  }
  if let Some(status) = params.status {
    bags.retain(|b| b.status == status);
  }
  if let Some(staff) = &params.assigned_staff_id {
    bags.retain(|b| b.assigned_staff_id.as_deref() == Some(staff.as_str()));
  }

  Ok(Json(bags))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /bags`. Snapshot fields left blank are
/// filled from the student's roster profile; an omitted `bagId` is
/// generated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBagBody {
  #[serde(default)]
  pub bag_id:         Option<String>,
  pub student_roll:   String,
  #[serde(default)]
  pub student_name:   Option<String>,
  #[serde(default)]
  pub hostel_block:   Option<String>,
  #[serde(default)]
  pub room:           Option<String>,
  #[serde(default)]
  pub contact:        Option<String>,
  pub declared_count: u32,
}

/// `POST /bags` — the drop-off action.
pub async fn create<K: KvStore>(
  State(state): State<AppState<K>>,
  Json(body): Json<CreateBagBody>,
) -> Result<impl IntoResponse, ApiError> {
  let profile = state.directory.find_student(&body.student_roll).await?;

  let pick = |given: Option<String>, stored: Option<&String>| {
    given
      .filter(|s| !s.trim().is_empty())
      .or_else(|| stored.cloned())
      .unwrap_or_default()
  };

  let input = NewBag {
    bag_id:         body
      .bag_id
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(generate_bag_id),
    student_name:   pick(body.student_name, profile.as_ref().map(|p| &p.name)),
    hostel_block:   pick(
      body.hostel_block,
      profile.as_ref().map(|p| &p.hostel_block),
    ),
    room:           pick(body.room, profile.as_ref().map(|p| &p.room)),
    contact:        pick(body.contact, profile.as_ref().map(|p| &p.contact)),
    student_roll:   body.student_roll,
    declared_count: body.declared_count,
  };

  let bag = state.repo.create(input).await?;
  Ok((StatusCode::CREATED, Json(bag)))
}

// ─── Get one / patch ──────────────────────────────────────────────────────────

/// `GET /bags/:id`
pub async fn get_one<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<String>,
) -> Result<Json<Bag>, ApiError> {
  Ok(Json(state.repo.get_by_id(&id).await?))
}

/// JSON body accepted by `PATCH /bags/:id`. Only the set fields are merged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBagBody {
  #[serde(default)]
  pub status:            Option<Stage>,
  #[serde(default)]
  pub assigned_staff_id: Option<String>,
  #[serde(default)]
  pub pickup_timestamp:  Option<DateTime<Utc>>,
  #[serde(default)]
  pub count_history:     Option<Vec<CountEntry>>,
}

/// `PATCH /bags/:id`
pub async fn update_one<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateBagBody>,
) -> Result<Json<Bag>, ApiError> {
  let patch = BagPatch {
    status:            body.status,
    assigned_staff_id: body.assigned_staff_id,
    pickup_timestamp:  body.pickup_timestamp,
    count_history:     body.count_history,
  };
  Ok(Json(state.repo.update(&id, patch).await?))
}

// ─── Assignment ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
  pub staff_id: String,
}

/// `POST /bags/:id/assign` — no already-assigned guard; a second call
/// overwrites. Callers gate the button on `assignedStaffId` themselves.
pub async fn assign_one<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<String>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Bag>, ApiError> {
  Ok(Json(state.repo.assign(&id, &body.staff_id).await?))
}

// ─── Stage transition ─────────────────────────────────────────────────────────

/// JSON body accepted by `POST /bags/:id/stage`. An unknown stage string or
/// a non-integer count fails deserialisation and surfaces as a 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStageBody {
  pub stage:    Stage,
  pub staff_id: String,
  pub count:    u32,
}

/// `POST /bags/:id/stage`
pub async fn record_stage_one<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<String>,
  Json(body): Json<RecordStageBody>,
) -> Result<Json<Bag>, ApiError> {
  Ok(Json(
    state
      .repo
      .record_stage(&id, body.stage, &body.staff_id, body.count)
      .await?,
  ))
}

// ─── Pickup ───────────────────────────────────────────────────────────────────

/// `POST /bags/:id/pickup`
pub async fn pickup_one<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<String>,
) -> Result<Json<Bag>, ApiError> {
  Ok(Json(state.repo.confirm_pickup(&id).await?))
}

// ─── Audit ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditBody {
  pub action:    String,
  pub by:        String,
  #[serde(default)]
  pub details:   Option<String>,
  #[serde(default)]
  pub timestamp: Option<DateTime<Utc>>,
}

/// `POST /bags/:id/audit`
pub async fn append_audit_one<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<String>,
  Json(body): Json<AuditBody>,
) -> Result<Json<Bag>, ApiError> {
  let entry = NewAuditEntry {
    action:    body.action,
    by:        body.by,
    details:   body.details,
    timestamp: body.timestamp,
  };
  Ok(Json(state.repo.append_audit(&id, entry).await?))
}
