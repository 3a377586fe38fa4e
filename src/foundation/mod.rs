/// Geometry aliases and pixel types.
pub mod core;
/// Error type shared by every module.
pub mod error;
/// Fixed-point and number parsing helpers.
pub mod math;
