//! Flint Core - Foundational types for the Flint particle engine
//!
//! This crate provides the core types that the other Flint crates depend on:
//! - `GroupId` - Stable particle group identifiers
//! - `Transform` - Spatial placement converted to `glam` affine transforms
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{FlintError, Result};
pub use id::GroupId;
pub use types::Transform;
