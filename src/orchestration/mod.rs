//! Orchestration layer for package deployment
//!
//! This module provides the high-level workflow that moves a batch of
//! build artifacts into the shared store and notifies the consumer.

pub mod publisher;

// Re-export main types for convenience
pub use publisher::{DeployOptions, DeployReport, PackagePublisher};
