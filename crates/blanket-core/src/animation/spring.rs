#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) animation.
//!
//! Drives the sheet's offset and height toward their landing values after a
//! release, and the entrance slide-in. Based on the classical damped spring
//! equation:
//!
//!   m·a = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **mass** (m): Inertia. Higher = slower, heavier motion.
//! - **stiffness** (k): Restoring force strength. Higher = faster response.
//! - **damping** (c): Velocity drag. Higher = less oscillation.
//!   - Underdamped (c < 2√(km)): oscillates past target before settling
//!   - Critically damped (c ≈ 2√(km)): fastest convergence without overshoot
//!   - Overdamped (c > 2√(km)): slow convergence, no overshoot
//! - **initial velocity**: absolute units/sec at the start of the motion.
//!
//! # Integration
//!
//! Semi-implicit Euler, subdivided into steps of at most 4ms so a long frame
//! does not destabilize a stiff spring.
//!
//! # Invariants
//!
//! 1. `position()` is the raw (unclamped) position.
//! 2. `value()` is the normalized progress from the initial position toward
//!    the target, clamped to [0.0, 1.0].
//! 3. A spring at rest stays at rest until `reset()` is called.
//! 4. Mass and stiffness are always positive, damping non-negative.
//!
//! # Failure Modes
//!
//! - Zero stiffness or mass: clamped to a small positive minimum.
//! - Zero damping: oscillates forever; `is_complete()` may never be true.
//! - Non-finite initial velocity: treated as zero.

use std::time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta below which the spring is "at rest".
const REST_THRESHOLD: f64 = 0.01;

/// Velocity (units/sec) below which the spring may come to rest.
const VELOCITY_THRESHOLD: f64 = 0.1;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Minimum mass to keep acceleration finite.
const MIN_MASS: f64 = 0.001;

/// Physical parameters of a spring, independent of where it starts or ends.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringParams {
    /// Inertia.
    pub mass: f64,
    /// Restoring force per unit of displacement.
    pub stiffness: f64,
    /// Drag per unit of velocity.
    pub damping: f64,
}

impl SpringParams {
    /// Explicit mass/stiffness/damping.
    #[must_use]
    pub const fn interpolating(mass: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            mass,
            stiffness,
            damping,
        }
    }

    /// Parameters from a perceptual description: `response` is the period
    /// (seconds) of the undamped oscillation, `damping_fraction` the ratio
    /// to critical damping. Mass is 1.
    #[must_use]
    pub fn from_response(response: f64, damping_fraction: f64) -> Self {
        let response = response.max(0.001);
        let omega = std::f64::consts::TAU / response;
        Self {
            mass: 1.0,
            stiffness: omega * omega,
            damping: 2.0 * damping_fraction.max(0.0) * omega,
        }
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::interpolating(1.0, 170.0, 26.0)
    }
}

/// A damped harmonic oscillator producing physically-based motion.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use blanket_core::animation::{Animation, Spring, SpringParams};
///
/// let mut spring = Spring::new(0.0, 100.0)
///     .with_params(SpringParams::interpolating(1.0, 200.0, 20.0));
///
/// for _ in 0..240 {
///     spring.tick(Duration::from_millis(16));
/// }
///
/// assert!((spring.position() - 100.0).abs() < 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    initial_velocity: f64,
    mass: f64,
    stiffness: f64,
    damping: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`.
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        let params = SpringParams::default();
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            initial_velocity: 0.0,
            mass: params.mass,
            stiffness: params.stiffness,
            damping: params.damping,
            at_rest: false,
        }
    }

    /// Apply mass, stiffness and damping (builder pattern).
    #[must_use]
    pub fn with_params(self, params: SpringParams) -> Self {
        self.with_mass(params.mass)
            .with_stiffness(params.stiffness)
            .with_damping(params.damping)
    }

    /// Set mass (builder pattern). Clamped to a small positive minimum.
    #[must_use]
    pub fn with_mass(mut self, m: f64) -> Self {
        self.mass = m.max(MIN_MASS);
        self
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set the starting velocity in absolute units/sec (builder pattern).
    #[must_use]
    pub fn with_initial_velocity(mut self, v: f64) -> Self {
        let v = if v.is_finite() { v } else { 0.0 };
        self.initial_velocity = v;
        self.velocity = v;
        self
    }

    /// Current position (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let spring_force = -self.stiffness * displacement;
        let damping_force = -self.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / self.mass;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let total_secs = dt.as_secs_f64();
        if total_secs <= 0.0 {
            return;
        }

        let mut remaining = total_secs;
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        let pos_delta = (self.position - self.target).abs();
        let vel_abs = self.velocity.abs();
        if pos_delta < REST_THRESHOLD && vel_abs < VELOCITY_THRESHOLD {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn value(&self) -> f32 {
        let span = self.target - self.initial;
        if span.abs() < f64::EPSILON {
            return if self.at_rest { 1.0 } else { 0.0 };
        }
        (((self.position - self.initial) / span) as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = self.initial_velocity;
        self.at_rest = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn simulate(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.tick(MS_16);
        }
    }

    fn release() -> SpringParams {
        SpringParams::interpolating(1.0, 200.0, 20.0)
    }

    #[test]
    fn spring_reaches_target() {
        let mut spring = Spring::new(0.0, 100.0).with_params(release());
        simulate(&mut spring, 200);
        assert!(
            (spring.position() - 100.0).abs() < 0.1,
            "position: {}",
            spring.position()
        );
        assert!(spring.is_complete());
    }

    #[test]
    fn heavier_mass_is_slower() {
        let mut light = Spring::new(0.0, 100.0).with_params(release());
        let mut heavy = Spring::new(0.0, 100.0)
            .with_params(release())
            .with_mass(4.0);
        simulate(&mut light, 5);
        simulate(&mut heavy, 5);
        assert!(
            light.position() > heavy.position(),
            "light {} heavy {}",
            light.position(),
            heavy.position()
        );
    }

    #[test]
    fn initial_velocity_moves_first_frame() {
        let mut resting = Spring::new(0.0, 100.0).with_params(release());
        let mut flung = Spring::new(0.0, 100.0)
            .with_params(release())
            .with_initial_velocity(2000.0);
        resting.tick(MS_16);
        flung.tick(MS_16);
        assert!(flung.position() > resting.position() + 10.0);
    }

    #[test]
    fn non_finite_initial_velocity_is_zeroed() {
        let spring = Spring::new(0.0, 1.0).with_initial_velocity(f64::INFINITY);
        assert_eq!(spring.velocity, 0.0);
    }

    #[test]
    fn from_response_matches_period() {
        let params = SpringParams::from_response(0.5, 1.0);
        let omega = (params.stiffness / params.mass).sqrt();
        assert!((omega - std::f64::consts::TAU / 0.5).abs() < 1e-9);
        let critical = 2.0 * (params.stiffness * params.mass).sqrt();
        assert!((params.damping - critical).abs() < 1e-9);
    }

    #[test]
    fn value_is_normalized_progress() {
        let mut spring = Spring::new(100.0, 300.0).with_params(release());
        assert_eq!(spring.value(), 0.0);
        simulate(&mut spring, 300);
        assert!((spring.value() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn spring_reverse_direction() {
        let mut spring = Spring::new(400.0, 0.0).with_params(release());
        simulate(&mut spring, 300);
        assert!(spring.position().abs() < 0.01, "position: {}", spring.position());
    }

    #[test]
    fn critical_damping_no_overshoot() {
        let k = 200.0;
        let mut spring = Spring::new(0.0, 100.0)
            .with_stiffness(k)
            .with_damping(2.0 * f64::sqrt(k));
        let mut max_pos = 0.0_f64;
        for _ in 0..300 {
            spring.tick(MS_16);
            max_pos = max_pos.max(spring.position());
        }
        assert!(max_pos < 100.5, "overshoot {max_pos}");
    }

    #[test]
    fn reset_restores_initial_motion() {
        let mut spring = Spring::new(42.0, 100.0).with_initial_velocity(-5.0);
        simulate(&mut spring, 200);
        spring.reset();
        assert_eq!(spring.position(), 42.0);
        assert_eq!(spring.velocity, -5.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn degenerate_parameters_clamped() {
        let spring = Spring::new(0.0, 1.0)
            .with_mass(0.0)
            .with_stiffness(-1.0)
            .with_damping(-1.0);
        assert!(spring.mass >= MIN_MASS);
        assert!(spring.stiffness >= MIN_STIFFNESS);
        assert_eq!(spring.damping, 0.0);
    }

    #[test]
    fn large_dt_subdivided() {
        let mut spring = Spring::new(0.0, 1.0).with_params(release());
        spring.tick(Duration::from_secs(5));
        assert!((spring.position() - 1.0).abs() < 0.01);
    }

    #[test]
    fn deterministic_across_runs() {
        let run = || {
            let mut spring = Spring::new(0.0, 300.0)
                .with_params(release())
                .with_initial_velocity(-120.0);
            (0..50)
                .map(|_| {
                    spring.tick(MS_16);
                    spring.position()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run(), "Spring should be deterministic");
    }
}
