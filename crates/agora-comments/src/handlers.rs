//! Handler for the comment widget placeholder.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/widgets/comments/{content_type_id}/{object_id}` | Optional `?comment=<id>` and `?categories=true` |

use std::collections::HashMap;

use agora_core::store::PlatformStore;
use axum::{
  extract::{Path, Query, State},
  response::Html,
};

use crate::{
  AppState,
  attributes::RequestContext,
  auth::CurrentViewer,
  error::Error,
  render::render_comments_widget,
};

/// Interpret a boolean query flag. Anything unrecognised is `false`.
fn parse_flag(value: &str) -> bool {
  matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// `GET /widgets/comments/{content_type_id}/{object_id}`
pub async fn comments_widget<S>(
  State(state): State<AppState<S>>,
  CurrentViewer(viewer): CurrentViewer,
  Path((content_type_id, object_id)): Path<(i64, i64)>,
  Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>, Error>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = state
    .store
    .load_subject(content_type_id, object_id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NotFound)?;

  let with_categories = query.get("categories").is_some_and(|v| parse_flag(v));
  let ctx = RequestContext { viewer, query };

  let html = render_comments_widget(&ctx, &subject, with_categories, &state.settings)?;

  tracing::debug!(
    content_type_id,
    object_id,
    authenticated = ctx.viewer.is_authenticated(),
    "rendered comment widget"
  );

  Ok(Html(html))
}

#[cfg(test)]
mod tests {
  use super::parse_flag;

  #[test]
  fn flag_values() {
    assert!(parse_flag("true"));
    assert!(parse_flag("1"));
    assert!(parse_flag("Yes"));
    assert!(!parse_flag("false"));
    assert!(!parse_flag(""));
    assert!(!parse_flag("maybe"));
  }
}
