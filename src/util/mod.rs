//! Utility types and functions for kitbash.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and the placement rotation matrices
//! - Line tokenising helpers

mod error;
pub mod math;
pub mod text;

pub use error::*;
pub use math::{DMat3, DVec2, DVec3, FEET_TO_METERS};
