//! Handlers for session and roster endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/session/student` | Upsert by roll; `created` flags first login |
//! | `POST`   | `/session/staff` | Lazy default-staff seed; permissive lookup |
//! | `POST`   | `/session/admin` | Password checked only against a stored admin |
//! | `GET`    | `/session` | The stored session or `null` |
//! | `DELETE` | `/session` | Logout |
//! | `GET`    | `/students` | Full roster |
//! | `PUT`    | `/students/:roll` | Profile setup |
//!
//! These are demo-grade flows: the session is a single trusted record with
//! no expiry or signature, and unknown usernames are accepted.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use washline_core::{
  directory::Student,
  kv::KvStore,
  session::{Role, Session},
};

use crate::{AppState, error::ApiError};

// ─── Student login ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StudentLoginBody {
  pub roll: String,
}

#[derive(Debug, Serialize)]
pub struct StudentLoginResponse {
  pub session: Session,
  /// `true` when this roll was first seen and a blank profile was created;
  /// callers route to profile setup in that case.
  pub created: bool,
}

/// `POST /session/student` — body: `{"roll":"21CS042"}`
pub async fn student_login<K: KvStore>(
  State(state): State<AppState<K>>,
  Json(body): Json<StudentLoginBody>,
) -> Result<Json<StudentLoginResponse>, ApiError> {
  let (student, created) = state.directory.login_student(&body.roll).await?;
  let session = state
    .sessions
    .login(Role::Student, student.roll, student.name)
    .await?;
  Ok(Json(StudentLoginResponse { session, created }))
}

// ─── Staff login ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StaffLoginBody {
  pub username: String,
}

/// `POST /session/staff` — body: `{"username":"staff1"}`
pub async fn staff_login<K: KvStore>(
  State(state): State<AppState<K>>,
  Json(body): Json<StaffLoginBody>,
) -> Result<Json<Session>, ApiError> {
  let staff = state.directory.login_staff(&body.username).await?;
  let session = state
    .sessions
    .login(Role::Staff, staff.id, staff.display_name)
    .await?;
  Ok(Json(session))
}

// ─── Admin login ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdminLoginBody {
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /session/admin` — body: `{"username":"admin","password":"admin123"}`
pub async fn admin_login<K: KvStore>(
  State(state): State<AppState<K>>,
  Json(body): Json<AdminLoginBody>,
) -> Result<Json<Session>, ApiError> {
  let admin = state
    .directory
    .login_admin(&body.username, &body.password)
    .await?;
  let session = state
    .sessions
    .login(Role::Admin, admin.username, admin.display_name)
    .await?;
  Ok(Json(session))
}

// ─── Session record ───────────────────────────────────────────────────────────

/// `GET /session` — the stored session, or `null` when absent/unreadable.
pub async fn current_session<K: KvStore>(
  State(state): State<AppState<K>>,
) -> Result<Json<Option<Session>>, ApiError> {
  Ok(Json(state.sessions.current().await?))
}

/// `DELETE /session`
pub async fn logout<K: KvStore>(
  State(state): State<AppState<K>>,
) -> Result<impl IntoResponse, ApiError> {
  state.sessions.logout().await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Roster ───────────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list_students<K: KvStore>(
  State(state): State<AppState<K>>,
) -> Result<Json<Vec<Student>>, ApiError> {
  Ok(Json(state.directory.list_students().await?))
}

/// JSON body accepted by `PUT /students/:roll` — the profile-setup form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStudentBody {
  pub name:         String,
  pub contact:      String,
  pub hostel_block: String,
  pub room:         String,
}

/// `PUT /students/:roll` — completes (or edits) a profile and clears the
/// first-login flag.
pub async fn save_student<K: KvStore>(
  State(state): State<AppState<K>>,
  Path(roll): Path<String>,
  Json(body): Json<SaveStudentBody>,
) -> Result<Json<Student>, ApiError> {
  let student = Student {
    batch:        roll.chars().take(2).collect(),
    roll,
    name:         body.name,
    contact:      body.contact,
    hostel_block: body.hostel_block,
    room:         body.room,
    first_login:  false,
  };
  Ok(Json(state.directory.save_student(student).await?))
}
