//! Persistence mixins shared by concrete entities.
//!
//! [`TimeStamped`] gives an entity a `created`/`modified` pair and the
//! pre-save hook that maintains it. [`UserGenerated`] layers a creator
//! reference on top. Stores call [`TimeStamped::pre_save`] immediately before
//! writing a row; entities never call it themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Field set ───────────────────────────────────────────────────────────────

/// The timestamp fields carried by every [`TimeStamped`] entity.
///
/// `created` is assigned when the value is constructed, not when it is first
/// written. `modified` stays `None` until the first update after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
  pub created:  DateTime<Utc>,
  pub modified: Option<DateTime<Utc>>,
}

impl Default for Timestamps {
  fn default() -> Self {
    Self {
      created:  Utc::now(),
      modified: None,
    }
  }
}

/// Per-call options for a store save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
  /// Leave `modified` untouched on an update (e.g. for counters or other
  /// bookkeeping writes that should not count as an edit).
  pub ignore_modified: bool,
}

impl SaveOptions {
  pub fn ignore_modified() -> Self { Self { ignore_modified: true } }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// An entity with creation and modification timestamps.
pub trait TimeStamped {
  /// The entity's primary key; `None` until the first save assigns one.
  fn pk(&self) -> Option<i64>;

  fn timestamps(&self) -> &Timestamps;

  fn timestamps_mut(&mut self) -> &mut Timestamps;

  fn created(&self) -> DateTime<Utc> { self.timestamps().created }

  fn modified(&self) -> Option<DateTime<Utc>> { self.timestamps().modified }

  /// Lifecycle hook run by the store before every write.
  fn pre_save(&mut self, opts: SaveOptions) { self.pre_save_at(opts, Utc::now()) }

  /// [`pre_save`](Self::pre_save) with an explicit clock reading.
  ///
  /// Only an update (the entity already has a primary key) bumps `modified`,
  /// and only when the caller has not opted out.
  fn pre_save_at(&mut self, opts: SaveOptions, now: DateTime<Utc>) {
    if self.pk().is_some() && !opts.ignore_modified {
      self.timestamps_mut().modified = Some(now);
    }
  }
}

/// Content owned by a user. Deleting the creator deletes the content.
pub trait UserGenerated: TimeStamped {
  /// The id of the user who created this entity.
  fn creator(&self) -> i64;
}
