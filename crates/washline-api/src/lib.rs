//! JSON REST API for Washline.
//!
//! Exposes an axum [`Router`] backed by any
//! [`washline_core::kv::KvStore`]. Auth hardening, TLS, and transport
//! concerns are the caller's responsibility — the session record is the
//! same trusted-as-is demo session the store layer keeps.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", washline_api::api_router(state.clone()))
//! ```

pub mod auth;
pub mod bags;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use washline_core::{
  directory::Directory, kv::KvStore, repo::BagRepository,
  session::SessionStore,
};

pub use error::ApiError;

/// Shared handler state. The session holder is explicit context here, not
/// ambient global state — the repository never reads it.
pub struct AppState<K> {
  pub repo:      Arc<BagRepository<K>>,
  pub sessions:  Arc<SessionStore<K>>,
  pub directory: Arc<Directory<K>>,
}

impl<K: KvStore + Clone> AppState<K> {
  pub fn new(kv: K) -> Self {
    Self {
      repo:      Arc::new(BagRepository::new(kv.clone())),
      sessions:  Arc::new(SessionStore::new(kv.clone())),
      directory: Arc::new(Directory::new(kv)),
    }
  }
}

// Manual impl: cloning the state must not require `K: Clone`.
impl<K> Clone for AppState<K> {
  fn clone(&self) -> Self {
    Self {
      repo:      Arc::clone(&self.repo),
      sessions:  Arc::clone(&self.sessions),
      directory: Arc::clone(&self.directory),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<K>(state: AppState<K>) -> Router<()>
where
  K: KvStore + 'static,
{
  Router::new()
    // Bags
    .route("/bags", get(bags::list::<K>).post(bags::create::<K>))
    .route(
      "/bags/{id}",
      get(bags::get_one::<K>).patch(bags::update_one::<K>),
    )
    .route("/bags/{id}/assign", post(bags::assign_one::<K>))
    .route("/bags/{id}/stage", post(bags::record_stage_one::<K>))
    .route("/bags/{id}/pickup", post(bags::pickup_one::<K>))
    .route("/bags/{id}/audit", post(bags::append_audit_one::<K>))
    // Roster
    .route("/students", get(auth::list_students::<K>))
    .route("/students/{roll}", put(auth::save_student::<K>))
    // Session
    .route(
      "/session",
      get(auth::current_session::<K>).delete(auth::logout::<K>),
    )
    .route("/session/student", post(auth::student_login::<K>))
    .route("/session/staff", post(auth::staff_login::<K>))
    .route("/session/admin", post(auth::admin_login::<K>))
    .with_state(state)
}
