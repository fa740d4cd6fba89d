//! Roster directory — student, staff, and admin records.
//!
//! Login flows are deliberately permissive, demo-grade: unknown students
//! are created on first login, unknown staff and admin usernames are
//! accepted with a synthesized identity, and the only credential actually
//! checked is a stored admin password. Records are never deleted.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  kv::{self, KvStore, keys},
};

// ─── Records ─────────────────────────────────────────────────────────────────

/// A student profile, keyed by roll number (unique).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub roll:         String,
  pub name:         String,
  pub contact:      String,
  pub hostel_block: String,
  pub room:         String,
  pub batch:        String,
  pub first_login:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
  pub id:           String,
  pub username:     String,
  pub display_name: String,
  pub active:       bool,
}

impl Staff {
  /// The lazily-seeded default staff record.
  pub fn default_record() -> Self {
    Self {
      id:           "staff-1".into(),
      username:     "staff1".into(),
      display_name: "Staff One".into(),
      active:       true,
    }
  }
}

/// An admin credential. The password is a plaintext demo seed; it is part
/// of the persisted-state contract, not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
  pub username:     String,
  pub password:     String,
  pub display_name: String,
}

impl Admin {
  pub fn default_record() -> Self {
    Self {
      username:     "admin".into(),
      password:     "admin123".into(),
      display_name: "Admin".into(),
    }
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Directory<K> {
  kv: K,
}

impl<K: KvStore> Directory<K> {
  pub fn new(kv: K) -> Self { Self { kv } }

  // ── Students ──────────────────────────────────────────────────────────

  pub async fn list_students(&self) -> Result<Vec<Student>> {
    Ok(
      kv::get_value(&self.kv, keys::STUDENTS)
        .await?
        .unwrap_or_default(),
    )
  }

  pub async fn find_student(&self, roll: &str) -> Result<Option<Student>> {
    Ok(
      self
        .list_students()
        .await?
        .into_iter()
        .find(|s| s.roll == roll),
    )
  }

  /// Login-time upsert by roll number. Unknown rolls get a fresh profile
  /// with `first_login = true` and the batch inferred from the roll's
  /// first two characters. Returns the profile and whether it was created.
  pub async fn login_student(&self, roll: &str) -> Result<(Student, bool)> {
    let roll = roll.trim();
    if roll.is_empty() {
      return Err(Error::InvalidArgument("roll number is required".into()));
    }

    let mut students = self.list_students().await?;
    if let Some(found) = students.iter().find(|s| s.roll == roll) {
      return Ok((found.clone(), false));
    }

    let student = Student {
      roll:         roll.to_owned(),
      name:         String::new(),
      contact:      String::new(),
      hostel_block: String::new(),
      room:         String::new(),
      batch:        roll.chars().take(2).collect(),
      first_login:  true,
    };
    students.push(student.clone());
    kv::set_value(&self.kv, keys::STUDENTS, &students).await?;
    Ok((student, true))
  }

  /// Profile-setup upsert: replace the record with the same roll, or add
  /// it if somehow absent.
  pub async fn save_student(&self, student: Student) -> Result<Student> {
    if student.roll.trim().is_empty() {
      return Err(Error::InvalidArgument("roll number is required".into()));
    }

    let mut students = self.list_students().await?;
    match students.iter_mut().find(|s| s.roll == student.roll) {
      Some(slot) => *slot = student.clone(),
      None => students.push(student.clone()),
    }
    kv::set_value(&self.kv, keys::STUDENTS, &students).await?;
    Ok(student)
  }

  // ── Staff ─────────────────────────────────────────────────────────────

  pub async fn list_staff(&self) -> Result<Vec<Staff>> {
    Ok(
      kv::get_value(&self.kv, keys::STAFF)
        .await?
        .unwrap_or_default(),
    )
  }

  /// Staff login: seeds the default record into an empty collection, then
  /// looks up by username. Unknown usernames are accepted with an ad-hoc
  /// identity that is NOT persisted.
  pub async fn login_staff(&self, username: &str) -> Result<Staff> {
    let username = username.trim();
    if username.is_empty() {
      return Err(Error::InvalidArgument("username is required".into()));
    }

    let mut staff = self.list_staff().await?;
    if staff.is_empty() {
      staff.push(Staff::default_record());
      kv::set_value(&self.kv, keys::STAFF, &staff).await?;
    }

    Ok(
      staff
        .into_iter()
        .find(|s| s.username == username)
        .unwrap_or_else(|| Staff {
          id:           username.to_owned(),
          username:     username.to_owned(),
          display_name: username.to_owned(),
          active:       true,
        }),
    )
  }

  // ── Admins ────────────────────────────────────────────────────────────

  pub async fn list_admins(&self) -> Result<Vec<Admin>> {
    Ok(
      kv::get_value(&self.kv, keys::ADMINS)
        .await?
        .unwrap_or_default(),
    )
  }

  /// Admin login. The password is only checked when a stored admin with a
  /// non-empty password matches the username; any other username is
  /// accepted with a synthesized display name.
  pub async fn login_admin(
    &self,
    username: &str,
    password: &str,
  ) -> Result<Admin> {
    let username = username.trim();
    if username.is_empty() {
      return Err(Error::InvalidArgument("username is required".into()));
    }

    let admins = self.list_admins().await?;
    match admins.into_iter().find(|a| a.username == username) {
      Some(found) => {
        if !found.password.is_empty() && password != found.password {
          return Err(Error::Validation("invalid password".into()));
        }
        Ok(found)
      }
      None => Ok(Admin {
        username:     username.to_owned(),
        password:     String::new(),
        display_name: "Admin".into(),
      }),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
