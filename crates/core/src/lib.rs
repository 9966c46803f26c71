//! Domain types and pure logic shared by every Judi Guard crate.
//!
//! This crate has no internal dependencies and performs no I/O, so it can be
//! used by the repository layer, the YouTube adapter, and the HTTP surface
//! alike.

pub mod comment_id;
pub mod deletion;
pub mod error;
pub mod one_time_codes;
pub mod singleflight;
pub mod status;
pub mod types;
pub mod video_url;
