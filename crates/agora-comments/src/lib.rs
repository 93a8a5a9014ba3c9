//! Comment widget layer for Agora.
//!
//! Resolves the attributes the client-side comment widget boots from and
//! renders them into a placeholder element. Exposes an axum [`Router`] serving
//! that fragment for any [`PlatformStore`].

pub mod attributes;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod render;
pub mod settings;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use agora_core::store::PlatformStore;
use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use settings::CommentSettings;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// `[key, label]` pairs offered to commenters when a widget asks for
  /// categories.
  #[serde(default)]
  pub comment_categories: Option<Vec<(String, String)>>,
}

impl ServerConfig {
  pub fn comment_settings(&self) -> CommentSettings {
    CommentSettings {
      comment_categories: self.comment_categories.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PlatformStore> {
  pub store:    Arc<S>,
  pub settings: Arc<CommentSettings>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] serving comment widget fragments.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/widgets/comments/{content_type_id}/{object_id}",
      get(handlers::comments_widget::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
