//! Acting identities and the permission-check interface they share.
//!
//! Real viewers ([`Viewer`], [`User`]) and the synthetic [`NormalUser`] all
//! implement [`Agent`], so callers can ask "may this one comment here?" and
//! "would an ordinary member be able to?" with the same call.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  project::Commentable,
  rules::{self, Principal},
};

// ─── Users ───────────────────────────────────────────────────────────────────

/// The roles a user holds across projects and organisations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memberships {
  pub participant_of: BTreeSet<i64>,
  pub moderator_of:   BTreeSet<i64>,
  /// Organisation ids.
  pub initiator_of:   BTreeSet<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  pub username:      String,
  pub is_superuser:  bool,
  /// PHC string produced by argon2; `None` disables password login.
  #[serde(skip)]
  pub password_hash: Option<String>,
  pub date_joined:   DateTime<Utc>,
  pub memberships:   Memberships,
}

/// The identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
  Anonymous,
  User(User),
}

impl Viewer {
  pub fn is_authenticated(&self) -> bool { matches!(self, Self::User(_)) }

  pub fn user(&self) -> Option<&User> {
    match self {
      Self::User(u) => Some(u),
      Self::Anonymous => None,
    }
  }
}

/// Stand-in for "an ordinary signed-in member with no special roles".
///
/// Never backed by a stored user; only used to probe what such a member would
/// be allowed to do or see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalUser;

// ─── Permission interface ────────────────────────────────────────────────────

/// Permission and context checks against a commentable subject.
///
/// Unknown permission keys are never granted.
pub trait Agent {
  fn has_perm(&self, perm: &str, subject: &dyn Commentable) -> bool;

  fn is_context_member(&self, subject: &dyn Commentable) -> bool;
}

impl Agent for User {
  fn has_perm(&self, perm: &str, subject: &dyn Commentable) -> bool {
    rules::has_perm(Principal::Member(self), perm, subject)
  }

  fn is_context_member(&self, subject: &dyn Commentable) -> bool {
    rules::is_context_member(Principal::Member(self), subject.project())
  }
}

impl Agent for NormalUser {
  fn has_perm(&self, perm: &str, subject: &dyn Commentable) -> bool {
    rules::has_perm(Principal::Normal, perm, subject)
  }

  fn is_context_member(&self, subject: &dyn Commentable) -> bool {
    rules::is_context_member(Principal::Normal, subject.project())
  }
}

impl Agent for Viewer {
  fn has_perm(&self, perm: &str, subject: &dyn Commentable) -> bool {
    match self {
      Self::User(u) => u.has_perm(perm, subject),
      Self::Anonymous => rules::has_perm(Principal::Anonymous, perm, subject),
    }
  }

  fn is_context_member(&self, subject: &dyn Commentable) -> bool {
    match self {
      Self::User(u) => u.is_context_member(subject),
      Self::Anonymous => {
        rules::is_context_member(Principal::Anonymous, subject.project())
      }
    }
  }
}
