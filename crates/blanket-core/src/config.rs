#![forbid(unsafe_code)]

//! Tunable thresholds and springs.

use crate::animation::SpringParams;

/// Thresholds, band lengths and springs used by the resolver and the drag
/// state machine.
///
/// Every field has a default; a partial config deserializes with the rest
/// filled in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BlanketConfig {
    /// Space kept free above the largest detent (default: 30).
    pub detent_margin: f64,
    /// Release speed (units/sec) beyond which a flick overrides the nearest
    /// detent (default: 50).
    pub velocity_threshold: f64,
    /// Downward offset past which releasing in moving mode dismisses
    /// (default: 50).
    pub dismiss_offset_threshold: f64,
    /// Rubber-band length when dragging the sheet above its resting
    /// position (default: 50).
    pub moving_band_length: f64,
    /// Rubber-band length when stretching past the largest detent
    /// (default: 20).
    pub overscroll_band_length: f64,
    /// Spring used to settle after a release.
    pub release_spring: SpringParams,
    /// Spring used for the entrance animation.
    pub entrance_spring: SpringParams,
}

impl Default for BlanketConfig {
    fn default() -> Self {
        Self {
            detent_margin: 30.0,
            velocity_threshold: 50.0,
            dismiss_offset_threshold: 50.0,
            moving_band_length: 50.0,
            overscroll_band_length: 20.0,
            release_spring: SpringParams::interpolating(1.0, 200.0, 20.0),
            entrance_spring: SpringParams::from_response(0.45, 0.825),
        }
    }
}
