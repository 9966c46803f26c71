//! YouTube Data API v3 adapter.
//!
//! - [`api`] -- the low-level [`api::YouTubeApi`] seam and its request shapes.
//! - [`http`] -- the reqwest-backed implementation of that seam.
//! - [`service`] -- video lookup, comment pagination, and ownership-checked
//!   delete/moderate operations built on the seam.
//! - [`oauth`] -- Google OAuth2 consent, code exchange, and token refresh.
//! - [`credentials`] -- where a user's YouTube tokens are persisted.
//! - [`authenticator`] -- keeps access tokens fresh with single-flight refresh.
//! - [`google_identity`] -- Google Sign-In ID-token verification.

pub mod api;
pub mod authenticator;
pub mod config;
pub mod credentials;
pub mod error;
pub mod google_identity;
pub mod http;
pub mod oauth;
pub mod service;
pub mod types;

pub use api::YouTubeApi;
pub use authenticator::YouTubeAuthenticator;
pub use config::YouTubeConfig;
pub use error::YouTubeError;
