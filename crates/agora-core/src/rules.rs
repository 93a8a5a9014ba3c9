//! Permission rules.
//!
//! Every check reduces an identity to a [`Principal`] and evaluates plain
//! predicates over it and the subject's [`Project`]. Only the comment
//! permission of the subject's own content type is registered; any other key
//! is denied.

use crate::{
  identity::User,
  project::{Commentable, Project},
};

/// The facts about an identity that the rules look at.
#[derive(Debug, Clone, Copy)]
pub enum Principal<'a> {
  Anonymous,
  /// Signed in, not a superuser, no memberships.
  Normal,
  Member(&'a User),
}

impl Principal<'_> {
  pub fn is_authenticated(&self) -> bool { !matches!(self, Self::Anonymous) }

  fn user(&self) -> Option<&User> {
    match self {
      Self::Member(u) => Some(u),
      Self::Anonymous | Self::Normal => None,
    }
  }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

pub fn is_participant(p: Principal<'_>, project: &Project) -> bool {
  match (p.user(), project.id) {
    (Some(u), Some(id)) => u.memberships.participant_of.contains(&id),
    _ => false,
  }
}

/// Superusers moderate everything.
pub fn is_moderator(p: Principal<'_>, project: &Project) -> bool {
  let Some(u) = p.user() else { return false };
  u.is_superuser
    || project
      .id
      .is_some_and(|id| u.memberships.moderator_of.contains(&id))
}

pub fn is_initiator(p: Principal<'_>, project: &Project) -> bool {
  p.user().is_some_and(|u| {
    u.memberships.initiator_of.contains(&project.organisation_id)
  })
}

/// The identity is "inside" the project: it is public, or the identity holds
/// any role in it.
pub fn is_context_member(p: Principal<'_>, project: &Project) -> bool {
  project.is_public
    || is_participant(p, project)
    || is_moderator(p, project)
    || is_initiator(p, project)
}

/// Moderators and initiators may always comment. Everyone else needs to be
/// signed in, on a published project whose phase is open for comments, and
/// either the project is public or they participate in it.
pub fn is_allowed_comment_item(p: Principal<'_>, project: &Project) -> bool {
  if is_moderator(p, project) || is_initiator(p, project) {
    return true;
  }
  p.is_authenticated()
    && !project.is_draft
    && project.comments_open
    && (project.is_public || is_participant(p, project))
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub fn has_perm(p: Principal<'_>, perm: &str, subject: &dyn Commentable) -> bool {
  if perm == subject.content_type().comment_permission() {
    is_allowed_comment_item(p, subject.project())
  } else {
    false
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    content_type::ContentType,
    identity::{Agent, Memberships, NormalUser, Viewer},
    project::{Item, Subject},
  };

  fn subject(configure: impl FnOnce(&mut Project)) -> Subject {
    let ct = ContentType {
      id:        4,
      app_label: "ideas".into(),
      model:     "proposal".into(),
    };
    let mut project = Project::new(10, "Riverside");
    project.id = Some(1);
    configure(&mut project);
    let mut item = Item::new(ct, 1, 99, "More benches");
    item.id = Some(42);
    Subject::new(item, project).unwrap()
  }

  fn user(configure: impl FnOnce(&mut User)) -> User {
    let mut u = User {
      id:            5,
      username:      "ada".into(),
      is_superuser:  false,
      password_hash: None,
      date_joined:   Utc::now(),
      memberships:   Memberships::default(),
    };
    configure(&mut u);
    u
  }

  fn open(p: &mut Project) {
    p.is_draft = false;
    p.comments_open = true;
  }

  const PERM: &str = "ideas.comment_proposal";

  #[test]
  fn normal_user_may_comment_on_open_public_project() {
    let s = subject(open);
    assert!(NormalUser.has_perm(PERM, &s));
    assert!(NormalUser.is_context_member(&s));
  }

  #[test]
  fn anonymous_may_never_comment() {
    let s = subject(open);
    assert!(!Viewer::Anonymous.has_perm(PERM, &s));
    assert!(Viewer::Anonymous.is_context_member(&s));
  }

  #[test]
  fn private_project_requires_participation() {
    let s = subject(|p| {
      open(p);
      p.is_public = false;
    });
    assert!(!NormalUser.has_perm(PERM, &s));
    assert!(!NormalUser.is_context_member(&s));

    let member = user(|u| {
      u.memberships.participant_of.insert(1);
    });
    assert!(member.has_perm(PERM, &s));
    assert!(member.is_context_member(&s));
  }

  #[test]
  fn draft_or_closed_phase_blocks_participants_but_not_moderators() {
    let s = subject(|p| p.is_draft = true);
    let participant = user(|u| {
      u.memberships.participant_of.insert(1);
    });
    let moderator = user(|u| {
      u.memberships.moderator_of.insert(1);
    });
    assert!(!participant.has_perm(PERM, &s));
    assert!(moderator.has_perm(PERM, &s));
  }

  #[test]
  fn initiator_of_organisation_may_comment() {
    let s = subject(|p| p.is_public = false);
    let initiator = user(|u| {
      u.memberships.initiator_of.insert(10);
    });
    assert!(initiator.has_perm(PERM, &s));
    assert!(initiator.is_context_member(&s));
  }

  #[test]
  fn superuser_counts_as_moderator() {
    let s = subject(|p| p.is_public = false);
    let admin = user(|u| u.is_superuser = true);
    assert!(admin.has_perm(PERM, &s));
    assert!(admin.is_context_member(&s));
  }

  #[test]
  fn unknown_permission_is_denied() {
    let s = subject(open);
    let admin = user(|u| u.is_superuser = true);
    assert!(!admin.has_perm("ideas.delete_proposal", &s));
    assert!(!admin.has_perm("budgeting.comment_proposal", &s));
  }
}
