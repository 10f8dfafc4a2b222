//! REST API client module for the F1Insight backend.
//!
//! `ApiClient` covers the unauthenticated surface (login, register, token
//! refresh, public catalog data). `AuthedClient` wraps it with bearer-token
//! attachment and the one-shot refresh-and-retry policy for the profile
//! probe and the betting game.
//!
//! All endpoints speak JSON over HTTP against a single configurable base URL.

pub mod authed;
pub mod client;
pub mod error;

pub use authed::AuthedClient;
pub use client::{ApiClient, TokenPair};
pub use error::ApiError;
