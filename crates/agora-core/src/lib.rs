//! Core types and trait definitions for the Agora participation platform.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod content_type;
pub mod error;
pub mod identity;
pub mod project;
pub mod rules;
pub mod store;
pub mod timestamps;

pub use error::{Error, Result};
