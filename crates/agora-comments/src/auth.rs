//! Resolve the request's [`Viewer`] from optional HTTP Basic credentials.
//!
//! No `Authorization` header means an anonymous viewer. A header that is
//! present but does not check out is rejected rather than downgraded.

use agora_core::{identity::Viewer, store::PlatformStore};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{AppState, error::Error};

/// Extractor yielding the identity behind the request.
pub struct CurrentViewer(pub Viewer);

/// Verify credentials from headers against the users in `store`.
pub async fn resolve_viewer<S>(headers: &HeaderMap, store: &S) -> Result<Viewer, Error>
where
  S: PlatformStore,
{
  let Some(header_val) = headers.get(axum::http::header::AUTHORIZATION) else {
    return Ok(Viewer::Anonymous);
  };
  let header_val = header_val.to_str().map_err(|_| Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let user = store
    .get_user_by_username(username)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthorized)?;

  let hash = user.password_hash.as_deref().ok_or(Error::Unauthorized)?;
  let parsed_hash = PasswordHash::new(hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Viewer::User(user))
}

impl<S> FromRequestParts<AppState<S>> for CurrentViewer
where
  S: PlatformStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let viewer = resolve_viewer(&parts.headers, state.store.as_ref()).await?;
    Ok(CurrentViewer(viewer))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use agora_store_sqlite::SqliteStore;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::{HeaderValue, header};
  use rand_core::OsRng;

  async fn store_with_user(password: &str) -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    store.add_user("ada".into(), Some(hash), false).await.unwrap();
    store.add_user("nopass".into(), None, false).await.unwrap();
    store
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let encoded = B64.encode(format!("{user}:{pass}"));
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
    );
    headers
  }

  #[tokio::test]
  async fn missing_header_is_anonymous() {
    let store = store_with_user("secret").await;
    let viewer = resolve_viewer(&HeaderMap::new(), &store).await.unwrap();
    assert_eq!(viewer, Viewer::Anonymous);
  }

  #[tokio::test]
  async fn correct_credentials() {
    let store = store_with_user("secret").await;
    let viewer = resolve_viewer(&basic("ada", "secret"), &store).await.unwrap();
    assert_eq!(viewer.user().map(|u| u.username.as_str()), Some("ada"));
  }

  #[tokio::test]
  async fn wrong_password() {
    let store = store_with_user("secret").await;
    let result = resolve_viewer(&basic("ada", "wrong"), &store).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_user_or_disabled_login() {
    let store = store_with_user("secret").await;
    assert!(matches!(
      resolve_viewer(&basic("bob", "secret"), &store).await,
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      resolve_viewer(&basic("nopass", ""), &store).await,
      Err(Error::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let store = store_with_user("secret").await;
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_static("Basic !!!not-base64!!!"),
    );
    assert!(matches!(
      resolve_viewer(&headers, &store).await,
      Err(Error::Unauthorized)
    ));
  }
}
