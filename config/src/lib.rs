//! # Config Crate
//!
//! Centralized configuration constants for the USD to Speckle importer.
//! Every fixed value the pipeline relies on (unit cube geometry, remote
//! endpoints, commit metadata, serialization limits) is defined here so the
//! parser, scene, mesh and sink crates agree on a single source of truth.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{API_TOKEN_ENV_VAR, UNIT_CUBE_HALF_EXTENT};
//!
//! assert_eq!(UNIT_CUBE_HALF_EXTENT, 0.5);
//! let token = std::env::var(API_TOKEN_ENV_VAR).ok();
//! # let _ = token;
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **No Runtime State**: Runtime configuration (credentials, sink settings)
//!   is built from these defaults by the crates that need it
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

#[cfg(test)]
mod tests;
