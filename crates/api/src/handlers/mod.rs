//! HTTP handlers, one module per resource.

pub mod analysis;
pub mod auth;
pub mod studio;
pub mod text;
pub mod users;
pub mod youtube;
