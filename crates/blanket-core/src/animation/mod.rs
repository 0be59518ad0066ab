#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! The sheet animates two scalars, its vertical offset and its height. Both
//! are [`AnimatedValue`]s: a plain value that may temporarily be driven by a
//! [`Spring`]. Interactive writes always win over a running spring, so a new
//! drag grabs the sheet mid-flight.

pub mod spring;

use std::time::Duration;

pub use spring::{Spring, SpringParams};

/// A time-driven animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has finished.
    fn is_complete(&self) -> bool;

    /// Normalized progress in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Return to the starting state.
    fn reset(&mut self);
}

/// Express an absolute release velocity relative to the distance still to
/// travel, the unit springs use for their initial velocity.
///
/// Returns `0.0` when `distance` is zero or the quotient is not finite, so a
/// release exactly on target starts the spring at rest.
#[must_use]
pub fn normalized_velocity(velocity: f64, distance: f64) -> f64 {
    if distance == 0.0 {
        return 0.0;
    }
    let v = velocity / distance;
    if v.is_finite() { v } else { 0.0 }
}

/// A scalar that is either at rest or springing toward a target.
#[derive(Debug, Clone)]
pub struct AnimatedValue {
    value: f64,
    spring: Option<Spring>,
}

impl AnimatedValue {
    /// A value at rest.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            spring: None,
        }
    }

    /// The presented value: the spring's position while animating.
    #[inline]
    #[must_use]
    pub fn get(&self) -> f64 {
        self.spring.as_ref().map_or(self.value, Spring::position)
    }

    /// Where the value is heading (equal to [`get`](Self::get) at rest).
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.value
    }

    /// Whether a spring is driving the value.
    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.spring.is_some()
    }

    /// Jump to `value`, cancelling any running spring.
    pub fn set(&mut self, value: f64) {
        self.value = value;
        self.spring = None;
    }

    /// Spring from the presented value to `target`.
    ///
    /// `unit_velocity` is the initial velocity as a fraction of the distance
    /// per second (see [`normalized_velocity`]).
    pub fn animate_to(&mut self, target: f64, params: SpringParams, unit_velocity: f64) {
        let from = self.get();
        let distance = target - from;
        let spring = Spring::new(from, target)
            .with_params(params)
            .with_initial_velocity(unit_velocity * distance);
        self.value = target;
        self.spring = Some(spring);
    }

    /// Advance a running spring. Returns `true` on the tick it comes to rest.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(spring) = self.spring.as_mut() else {
            return false;
        };
        spring.tick(dt);
        if spring.is_complete() {
            self.spring = None;
            true
        } else {
            false
        }
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}
