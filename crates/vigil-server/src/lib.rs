//! Vigil server library entry.
//!
//! Wires configuration, opaque backends (classifier, market data), the
//! per-service metric sets and the axum routers for predict-service and
//! quote-service. Consumed by the binary (`main.rs`) and integration tests.

pub mod app_state;
pub mod backend;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
