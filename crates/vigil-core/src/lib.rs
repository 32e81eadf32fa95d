//! Vigil core: error surface and the in-process metrics layer.
//!
//! This crate owns the counter/gauge/histogram instruments, the registry that
//! hands them out, and the Prometheus text encoder. It carries no HTTP or
//! runtime dependencies so services and tests can use it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Wiring mistakes (duplicate names, wrong labels) surface as `VigilError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{Result, VigilError};
