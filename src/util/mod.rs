//! Utility module
//!
//! Unit conversions applied when presenting decoded reports.

use std::f32::consts::PI as PI32;
use std::f64::consts::PI as PI64;

/// Year the software version report counts from
pub const VERSION_YEAR_BASE: u16 = 2000;

/// Converts radians to degrees
pub fn rad_to_deg32(rad: f32) -> f32 {
    rad * 180.0 / PI32
}

/// Converts radians to degrees
pub fn rad_to_deg64(rad: f64) -> f64 {
    rad * 180.0 / PI64
}

/// Rounds half-way values up, towards positive infinity
pub fn round_to_int(x: f32) -> i32 {
    (x + 0.5).floor() as i32
}

/// Reconstructs a calendar year from the offset in a software version report
pub fn full_year(offset: u8) -> u16 {
    VERSION_YEAR_BASE + offset as u16
}
