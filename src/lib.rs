//! Detection analysis library
//!
//! Residency and movement-graph analysis of acoustic telemetry detections.
//! Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod error;
pub mod infra;
pub mod io;
pub mod services;
