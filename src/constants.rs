//! # Constants and type definitions for visitxy
//!
//! This module centralizes the **unit type aliases**, **sentinel values**, and
//! **conversion factors** used throughout the `visitxy` library.
//!
//! ## Overview
//!
//! - Angle and pixel unit aliases used across the crate
//! - The unassigned-visit and unprojected-pixel sentinels
//! - Degree ↔ radian conversion
//!
//! These definitions are used by all main modules: footprint loading, visit
//! assignment, projection, and output building.

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Pixel coordinate in a visit-local image frame
pub type Pixel = f64;

/// Identifier of a single visit (sub-exposure).
///
/// Real visit identifiers are non-negative; the negative space is reserved for
/// sentinels such as [`UNASSIGNED_VISIT`].
pub type VisitId = i64;

/// Visit id assigned to a source whose coordinates fall inside no footprint.
///
/// Footprint files are validated to contain only non-negative visit ids, so
/// this value can never collide with a real visit.
pub const UNASSIGNED_VISIT: VisitId = -1;

/// Initial value of the `visit_X`/`visit_Y` output columns.
///
/// Rows still carrying this value after a run were either unassigned or
/// belong to a visit whose transform could not be loaded.
pub const PIXEL_SENTINEL: Pixel = 1.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-12;
