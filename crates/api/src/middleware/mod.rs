//! Request extractors for authentication.
//!
//! - [`auth::AuthUser`] -- the active user identified by a JWT Bearer token.

pub mod auth;
