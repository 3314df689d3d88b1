//! REST client for the Thumbsmith backend API.
//!
//! Wraps the HTTP surface the web client talks to: account/session
//! endpoints, thumbnail creation (multipart upload), fetch-by-id,
//! visibility patching, and the public community listing. Wire types
//! mirror the backend's JSON verbatim.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, ThumbnailApi};
pub use auth::AuthApi;
pub use config::ClientConfig;
