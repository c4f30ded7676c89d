//! HTTP client for the paginated collection API.
//!
//! One [`CollectionClient`] per endpoint (jobs, applications, invitations).
//! The client is a thin typed boundary: paginated GET, per-resource PATCH,
//! and a stats GET, all authenticated through a caller-supplied
//! [`TokenProvider`]. It knows nothing about how credentials are obtained
//! or refreshed, and nothing about record types beyond serde.

mod auth;
mod client;
mod error;


pub use auth::{StaticToken, TokenProvider};
pub use client::CollectionClient;
pub use error::ApiError;
