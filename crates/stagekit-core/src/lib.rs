//! # StageKit Core
//!
//! Core types and utilities shared by the StageKit canvas and timeline
//! crates: 2D geometry primitives, editor-wide constants, and error types.

pub mod constants;
pub mod error;
pub mod geometry;

pub use error::{Result, StageError};
pub use geometry::{normalize_deg, normalize_rad, rect_corners, rotate_around, Bounds, Point};
