//! Test Helper Utilities
//!
//! Shared utilities for testing dream-analysis

#![allow(dead_code)]

pub mod artifacts;

pub use artifacts::{write_artifacts, ArtifactSpec};
