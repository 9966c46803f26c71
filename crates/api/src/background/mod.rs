//! Background tasks spawned at server startup.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a `CancellationToken` and
//! return once it is cancelled.

pub mod token_sweeper;
