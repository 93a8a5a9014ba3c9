//! The `PlatformStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `agora-store-sqlite`).
//! Higher layers (`agora-comments`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  content_type::ContentType,
  identity::User,
  project::{Item, Project, Subject},
  timestamps::SaveOptions,
};

/// Abstraction over an Agora store backend.
///
/// Every save of a [`TimeStamped`](crate::timestamps::TimeStamped) entity runs
/// its `pre_save` hook before the row is written, and assigns the primary key
/// on first insert.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PlatformStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. `password_hash` is an argon2 PHC string, if any.
  fn add_user(
    &self,
    username: String,
    password_hash: Option<String>,
    is_superuser: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user and their memberships. Returns `None` if not found.
  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Delete a user. Everything they created is deleted with them.
  fn delete_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Memberships ───────────────────────────────────────────────────────

  fn add_participant(
    &self,
    project_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_moderator(
    &self,
    project_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_initiator(
    &self,
    organisation_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Content types ─────────────────────────────────────────────────────

  /// Get or create the content type for `(app_label, model)`.
  fn content_type_for<'a>(
    &'a self,
    app_label: &'a str,
    model: &'a str,
  ) -> impl Future<Output = Result<ContentType, Self::Error>> + Send + 'a;

  fn get_content_type(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ContentType>, Self::Error>> + Send + '_;

  // ── Projects and items ────────────────────────────────────────────────

  /// Insert or update `project`, assigning its id on first save.
  fn save_project<'a>(
    &'a self,
    project: &'a mut Project,
    opts: SaveOptions,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_project(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Insert or update `item`, assigning its id on first save.
  fn save_item<'a>(
    &'a self,
    item: &'a mut Item,
    opts: SaveOptions,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_item(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  fn items_by_creator(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  /// Resolve a `(content type, object id)` reference to a commentable
  /// subject. Returns `None` if no such object exists.
  fn load_subject(
    &self,
    content_type_id: i64,
    object_id: i64,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;
}
