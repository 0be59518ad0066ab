#![forbid(unsafe_code)]

//! Drag state machine: turns drag translations into sheet height and offset.
//!
//! A drag either **resizes** the sheet (its height follows the finger) or
//! **moves** it (the whole sheet translates, heading toward dismissal). Which
//! one happens is decided on every update from the height the drag proposes:
//!
//! - below the smallest detent → [`GestureMode::Moving`]: height override
//!   released, offset follows the finger with rubber-banding above rest;
//! - above the largest detent → [`GestureMode::Overscroll`]: height
//!   rubber-banded around the largest detent;
//! - otherwise → [`GestureMode::Stretching`]: offset pinned at rest, height
//!   tracks the finger.
//!
//! On release the sheet springs to the nearest detent (resize) or back to
//! rest / off-screen (move).
//!
//! # Invariants
//!
//! 1. Base values are captured lazily on first need within a drag and are
//!    all cleared by [`DragSession::on_end`]; nothing leaks into the next
//!    drag.
//! 2. Updates are applied in delivery order; each one is a pure function of
//!    the captured bases and the latest translation.
//! 3. While moving, the offset never goes more than the band length above
//!    rest.
//!
//! # Failure Modes
//!
//! - Release exactly on target: the spring starts with zero velocity rather
//!   than dividing by zero.

use tracing::debug;

use crate::animation::{AnimatedValue, normalized_velocity};
use crate::config::BlanketConfig;
use crate::detent::ResolvedDetent;
use crate::geometry::Vector;
use crate::resolve::Resolution;
use crate::rubber_band::rubber_band;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a drag update did to the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum GestureMode {
    /// Dragged below the smallest detent: translating the whole sheet.
    Moving,
    /// Dragged above the largest detent: height rubber-banded.
    Overscroll,
    /// Between detents: height follows the finger.
    Stretching,
}

/// Where a released sheet is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case", tag = "kind")
)]
pub enum ReleasePlan {
    /// Spring the height override to a detent.
    Snap {
        /// The landing detent.
        detent: ResolvedDetent,
        /// Drop the override once settled (landing on the smallest detent).
        release_to_intrinsic: bool,
        /// Initial spring velocity relative to the distance.
        unit_velocity: f64,
    },
    /// Spring the offset back to rest or off-screen.
    Translate {
        /// Target offset.
        target: f64,
        /// Whether the sheet dismisses when the spring settles.
        dismiss: bool,
        /// Initial spring velocity relative to the distance.
        unit_velocity: f64,
    },
}

impl ReleasePlan {
    /// Whether settling this plan ends the presentation.
    #[must_use]
    pub fn dismisses(&self) -> bool {
        matches!(self, Self::Translate { dismiss: true, .. })
    }
}

/// Capability of renderers with an inner scrollable region.
///
/// When the lock is enabled the inner region must not scroll so the drag
/// goes to the sheet. Renderers without scrollable content ignore it.
pub trait ScrollLockControl {
    /// Apply the lock state.
    fn set_scroll_lock_enabled(&mut self, enabled: bool);
}

/// State that lives for the whole presentation and is shaped by drags.
#[derive(Debug, Clone)]
pub struct SheetMotion {
    /// Vertical translation of the whole sheet; `0` at rest, positive down.
    pub content_offset: AnimatedValue,
    /// Height override; `None` sizes the sheet to its content.
    pub custom_height: Option<AnimatedValue>,
    /// Whether inner scrolling is locked.
    pub scroll_lock_enabled: bool,
}

impl SheetMotion {
    /// At rest with the given offset, no height override, lock enabled.
    #[must_use]
    pub fn new(offset: f64) -> Self {
        Self {
            content_offset: AnimatedValue::new(offset),
            custom_height: None,
            scroll_lock_enabled: true,
        }
    }

    /// Presented height override, if any.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        self.custom_height.as_ref().map(AnimatedValue::get)
    }

    /// Presented offset.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.content_offset.get()
    }

    fn set_height(&mut self, height: f64) {
        match self.custom_height.as_mut() {
            Some(h) => h.set(height),
            None => self.custom_height = Some(AnimatedValue::new(height)),
        }
    }
}

impl Default for SheetMotion {
    fn default() -> Self {
        Self::new(0.0)
    }
}

// ---------------------------------------------------------------------------
// DragSession
// ---------------------------------------------------------------------------

/// Values captured during one continuous drag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragSession {
    base_offset: Option<f64>,
    base_translation: Option<Vector>,
    base_custom_height: Option<f64>,
}

impl DragSession {
    /// An empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any base value has been captured (a drag is in progress).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.base_custom_height.is_some()
            || self.base_offset.is_some()
            || self.base_translation.is_some()
    }

    /// Captured base offset, set on first entry into moving mode.
    #[must_use]
    pub fn base_offset(&self) -> Option<f64> {
        self.base_offset
    }

    /// Captured translation at first entry into moving mode.
    #[must_use]
    pub fn base_translation(&self) -> Option<Vector> {
        self.base_translation
    }

    /// Captured height at the first update of the drag.
    #[must_use]
    pub fn base_custom_height(&self) -> Option<f64> {
        self.base_custom_height
    }

    /// Drop every captured value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Apply one drag update.
    ///
    /// `content_height` is the measured intrinsic height used as the base when
    /// no override is active.
    pub fn on_change(
        &mut self,
        motion: &mut SheetMotion,
        translation: Vector,
        resolution: &Resolution,
        content_height: f64,
        config: &BlanketConfig,
    ) -> GestureMode {
        let base_height = *self
            .base_custom_height
            .get_or_insert_with(|| motion.height().unwrap_or(content_height));

        let proposed_height = base_height - translation.dy;
        let lowest = resolution.detents.min_detent().offset;
        let highest = resolution.detents.max_detent().offset;

        if proposed_height < lowest {
            let base_offset = *self.base_offset.get_or_insert_with(|| motion.offset());
            let base_translation = *self.base_translation.get_or_insert(translation);

            motion.custom_height = None;
            motion.scroll_lock_enabled = true;

            let proposed_offset = base_offset + translation.dy - base_translation.dy;
            motion.content_offset.set(rubber_band(
                proposed_offset,
                0.0,
                f64::INFINITY,
                config.moving_band_length,
            ));
            GestureMode::Moving
        } else if proposed_height > highest {
            motion.set_height(rubber_band(
                proposed_height,
                highest,
                highest,
                config.overscroll_band_length,
            ));
            motion.scroll_lock_enabled = false;
            GestureMode::Overscroll
        } else {
            motion.content_offset.set(0.0);
            motion.scroll_lock_enabled = true;
            motion.set_height(proposed_height);
            GestureMode::Stretching
        }
    }

    /// Finish the drag with release `velocity` and start the settling spring.
    pub fn on_end(
        &mut self,
        motion: &mut SheetMotion,
        velocity: Vector,
        resolution: &Resolution,
        config: &BlanketConfig,
    ) -> ReleasePlan {
        self.clear();

        let plan = if let Some(height) = motion.custom_height.as_mut() {
            let current = height.get();
            let detent =
                resolution
                    .detents
                    .nearest(current, velocity.dy, config.velocity_threshold);
            // Height grows upward while velocity is measured downward.
            let unit_velocity = -normalized_velocity(velocity.dy, detent.offset - current);
            height.animate_to(detent.offset, config.release_spring, unit_velocity);

            let release_to_intrinsic = detent == resolution.detents.min_detent();
            debug!(
                from = current,
                to = detent.offset,
                velocity = velocity.dy,
                release_to_intrinsic,
                "release: snapping height"
            );
            ReleasePlan::Snap {
                detent,
                release_to_intrinsic,
                unit_velocity,
            }
        } else {
            let current = motion.content_offset.get();
            let dismiss = velocity.dy > config.velocity_threshold
                || current > config.dismiss_offset_threshold;
            let target = if dismiss { resolution.hidden_offset } else { 0.0 };
            let unit_velocity = normalized_velocity(velocity.dy, target - current);
            motion
                .content_offset
                .animate_to(target, config.release_spring, unit_velocity);

            debug!(
                from = current,
                to = target,
                velocity = velocity.dy,
                dismiss,
                "release: translating"
            );
            ReleasePlan::Translate {
                target,
                dismiss,
                unit_velocity,
            }
        };

        motion.scroll_lock_enabled = false;
        plan
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
