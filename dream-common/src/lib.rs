//! # Dream Common Library
//!
//! Shared code for the dream analysis workspace:
//! - Error type used across crates
//! - TOML configuration loading with graceful degradation
//! - Root folder resolution (CLI → ENV → TOML → compiled default)

pub mod config;
pub mod error;

pub use error::{Error, Result};
