//! Plume Core - Foundational types for the Plume particle engine
//!
//! This crate provides the types that all other Plume crates depend on:
//! - `Vec3`, `Color` - Spatial and colour types shared by CPU and GPU code
//! - Error types and Result alias

mod error;
mod types;

pub use error::{PlumeError, Result};
pub use types::{mat4_mul, Color, Vec3};
