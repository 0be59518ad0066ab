#![forbid(unsafe_code)]

//! The sheet controller.
//!
//! [`BlanketController`] owns everything one presentation needs: the
//! measured geometry, the resolved detents, the presentation phase, the
//! animated offset and height, and the current drag. Hosts feed it
//! measurements and drag events, call [`flush`](BlanketController::flush) at
//! the end of every update cycle and [`tick`](BlanketController::tick) once
//! per frame, then render [`frame`](BlanketController::frame).
//!
//! # Update cycle
//!
//! Measurement callbacks must not mutate layout-dependent state while layout
//! is running, so `set_content_size` and friends only queue a task. `flush`
//! applies the tasks queued before it was called, re-resolves once if
//! anything changed, and leaves tasks scheduled during the flush (the
//! `ContentLoaded → Displaying` step) for the next cycle.
//!
//! # Invariants
//!
//! 1. Resolution requires content size, container size and a detent
//!    declaration; until all three are known the previous resolution stays.
//! 2. Resolution is not recomputed while a height override is active; it
//!    runs again once the override is released.
//! 3. Drag events before the first resolution are ignored.
//! 4. Dismissal discards the resolution, the measured content and all drag
//!    state, and resets the phase to `ContentUnloaded`.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::BlanketConfig;
use crate::detent::Detent;
use crate::geometry::{Size, Vector};
use crate::gesture::{DragSession, GestureMode, ReleasePlan, ScrollLockControl, SheetMotion};
use crate::lifecycle::{Phase, PresentationLifecycle};
use crate::resolve::{ResolveInput, Resolution, resolve};

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Notifications for the host, drained with
/// [`drain_events`](BlanketController::drain_events).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case", tag = "event")
)]
pub enum BlanketEvent {
    /// The presentation phase changed.
    PhaseChanged {
        /// The new phase.
        phase: Phase,
    },
    /// Inner scrolling was locked or unlocked.
    ScrollLockChanged {
        /// New lock state.
        enabled: bool,
    },
    /// A settling spring came to rest.
    Settled {
        /// Offset after settling.
        offset: f64,
        /// Height override after settling.
        height: Option<f64>,
    },
    /// A dismiss animation finished; the host should flip its presented flag.
    DismissRequested,
    /// The presentation ended and its state was discarded.
    Dismissed,
}

/// What the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlanketFrame {
    /// Vertical translation to apply to the sheet.
    pub offset: f64,
    /// Height constraint; `None` sizes the sheet to its content.
    pub height: Option<f64>,
    /// Whether inner scrolling is locked.
    pub scroll_lock_enabled: bool,
    /// Presentation phase.
    pub phase: Phase,
    /// Whether the sheet is presented.
    pub presented: bool,
}

// ---------------------------------------------------------------------------
// Deferred tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Deferred {
    ContentSize(Size),
    ContainerSize(Size),
    Detents(Vec<Detent>),
    SafeAreaBottom(f64),
    EnterDisplaying,
}

impl Deferred {
    /// Tasks tied to the presented content rather than the host.
    fn is_session_scoped(&self) -> bool {
        matches!(
            self,
            Self::ContentSize(_) | Self::Detents(_) | Self::EnterDisplaying
        )
    }
}

// ---------------------------------------------------------------------------
// BlanketController
// ---------------------------------------------------------------------------

/// Drives one bottom sheet.
pub struct BlanketController {
    config: BlanketConfig,
    presented: bool,
    lifecycle: PresentationLifecycle,

    // Inputs
    content_size: Option<Size>,
    container_size: Option<Size>,
    detents: Option<Vec<Detent>>,
    safe_area_bottom: f64,

    // Derived
    resolution: Option<Resolution>,
    needs_resolve: bool,

    // Motion
    motion: SheetMotion,
    drag: DragSession,
    dismiss_pending: bool,
    release_to_intrinsic: bool,

    deferred: VecDeque<Deferred>,
    events: Vec<BlanketEvent>,
    on_dismiss: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for BlanketController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlanketController")
            .field("presented", &self.presented)
            .field("phase", &self.lifecycle.phase())
            .field("offset", &self.motion.offset())
            .field("height", &self.motion.height())
            .field("resolved", &self.resolution.is_some())
            .field("dragging", &self.drag.is_active())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl Default for BlanketController {
    fn default() -> Self {
        Self::new(BlanketConfig::default())
    }
}

impl BlanketController {
    /// A dismissed controller with the given configuration.
    #[must_use]
    pub fn new(config: BlanketConfig) -> Self {
        Self {
            config,
            presented: false,
            lifecycle: PresentationLifecycle::new(),
            content_size: None,
            container_size: None,
            detents: None,
            safe_area_bottom: 0.0,
            resolution: None,
            needs_resolve: false,
            motion: SheetMotion::default(),
            drag: DragSession::new(),
            dismiss_pending: false,
            release_to_intrinsic: false,
            deferred: VecDeque::new(),
            events: Vec::new(),
            on_dismiss: None,
        }
    }

    /// Call `f` every time a presentation ends (builder pattern).
    #[must_use]
    pub fn with_on_dismiss(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_dismiss = Some(Box::new(f));
        self
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BlanketConfig {
        &self.config
    }

    // -- Presentation -------------------------------------------------------

    /// Open the sheet. Measurement starts from scratch.
    pub fn present(&mut self) {
        if self.presented {
            return;
        }
        debug!("present");
        self.presented = true;
        self.needs_resolve = true;
    }

    /// Close the sheet immediately, discarding the session.
    pub fn dismiss(&mut self) {
        if !self.presented {
            return;
        }
        debug!("dismiss");
        self.unload();
    }

    /// Follow an external presented flag.
    pub fn set_presented(&mut self, presented: bool) {
        if presented {
            self.present();
        } else {
            self.dismiss();
        }
    }

    fn unload(&mut self) {
        self.presented = false;
        if self.lifecycle.reset() {
            self.events.push(BlanketEvent::PhaseChanged {
                phase: Phase::ContentUnloaded,
            });
        }
        self.content_size = None;
        self.detents = None;
        self.resolution = None;
        self.needs_resolve = false;
        self.motion = SheetMotion::default();
        self.drag.clear();
        self.dismiss_pending = false;
        self.release_to_intrinsic = false;
        self.deferred.retain(|task| !task.is_session_scoped());
        self.events.push(BlanketEvent::Dismissed);
        if let Some(on_dismiss) = self.on_dismiss.as_mut() {
            on_dismiss();
        }
    }

    // -- Measurement inputs (deferred) --------------------------------------

    /// Report the measured content size.
    pub fn set_content_size(&mut self, size: Size) {
        self.deferred.push_back(Deferred::ContentSize(size));
    }

    /// Report the largest size the container offers.
    pub fn set_container_size(&mut self, size: Size) {
        self.deferred.push_back(Deferred::ContainerSize(size));
    }

    /// Report the declared detents. An empty declaration means fit-to-content.
    pub fn set_detents(&mut self, detents: impl IntoIterator<Item = Detent>) {
        self.deferred
            .push_back(Deferred::Detents(detents.into_iter().collect()));
    }

    /// Report the bottom safe-area inset.
    pub fn set_safe_area_bottom(&mut self, inset: f64) {
        self.deferred.push_back(Deferred::SafeAreaBottom(inset));
    }

    /// End of an update cycle: apply queued tasks and re-resolve if needed.
    pub fn flush(&mut self) {
        let mut changed = false;
        let queued = self.deferred.len();

        for _ in 0..queued {
            let Some(task) = self.deferred.pop_front() else {
                break;
            };
            match task {
                Deferred::ContentSize(size) => {
                    changed |= self.content_size.replace(size) != Some(size);
                }
                Deferred::ContainerSize(size) => {
                    changed |= self.container_size.replace(size) != Some(size);
                }
                Deferred::Detents(mut detents) => {
                    detents.sort();
                    detents.dedup();
                    changed |= self.detents.as_ref() != Some(&detents);
                    self.detents = Some(detents);
                }
                Deferred::SafeAreaBottom(inset) => {
                    changed |= self.safe_area_bottom != inset;
                    self.safe_area_bottom = inset;
                }
                Deferred::EnterDisplaying => self.enter_displaying(),
            }
        }

        if changed || self.needs_resolve {
            self.dispatch_resolve();
        }
    }

    fn dispatch_resolve(&mut self) {
        if !self.presented {
            return;
        }
        let (Some(content_size), Some(container_size), Some(detents)) = (
            self.content_size,
            self.container_size,
            self.detents.as_deref(),
        ) else {
            trace!("resolve skipped: geometry incomplete");
            return;
        };
        if self.motion.custom_height.is_some() {
            trace!("resolve deferred: height override active");
            self.needs_resolve = true;
            return;
        }
        self.needs_resolve = false;

        let resolution = resolve(
            &ResolveInput {
                detents,
                content_size,
                container_size,
                safe_area_bottom: self.safe_area_bottom,
            },
            &self.config,
        );
        let hidden_offset = resolution.hidden_offset;
        if self.resolution.as_ref() != Some(&resolution) {
            self.resolution = Some(resolution);
        }

        if self.lifecycle.advance_to(Phase::ContentLoaded) {
            self.events.push(BlanketEvent::PhaseChanged {
                phase: Phase::ContentLoaded,
            });
            self.motion.content_offset.set(hidden_offset);
            self.deferred.push_back(Deferred::EnterDisplaying);
        }
    }

    fn enter_displaying(&mut self) {
        if self.lifecycle.advance_to(Phase::Displaying) {
            debug!("entrance");
            self.events.push(BlanketEvent::PhaseChanged {
                phase: Phase::Displaying,
            });
            self.motion
                .content_offset
                .animate_to(0.0, self.config.entrance_spring, 0.0);
        }
    }

    // -- Drag ---------------------------------------------------------------

    /// A drag moved; `translation` is the total since the drag began.
    ///
    /// Returns `None` (and does nothing) until detents have been resolved.
    pub fn on_change(&mut self, translation: Vector) -> Option<GestureMode> {
        let Some(resolution) = self.resolution.as_ref() else {
            debug!("drag ignored: detents not resolved");
            return None;
        };

        // Grabbing the sheet interrupts any settle in flight.
        self.dismiss_pending = false;
        self.release_to_intrinsic = false;

        let content_height = self.content_size.map_or(0.0, |s| s.height);
        let was_locked = self.motion.scroll_lock_enabled;
        let mode = self.drag.on_change(
            &mut self.motion,
            translation,
            resolution,
            content_height,
            &self.config,
        );
        trace!(?mode, dy = translation.dy, "drag");
        self.note_scroll_lock(was_locked);
        Some(mode)
    }

    /// The drag ended with release `velocity` (units/sec).
    ///
    /// Returns `None` (and does nothing beyond clearing drag state) until
    /// detents have been resolved.
    pub fn on_end(&mut self, velocity: Vector) -> Option<ReleasePlan> {
        let Some(resolution) = self.resolution.as_ref() else {
            self.drag.clear();
            debug!("release ignored: detents not resolved");
            return None;
        };

        let was_locked = self.motion.scroll_lock_enabled;
        let plan = self
            .drag
            .on_end(&mut self.motion, velocity, resolution, &self.config);
        match plan {
            ReleasePlan::Snap {
                release_to_intrinsic,
                ..
            } => self.release_to_intrinsic = release_to_intrinsic,
            ReleasePlan::Translate { dismiss, .. } => self.dismiss_pending = dismiss,
        }
        self.note_scroll_lock(was_locked);
        Some(plan)
    }

    fn note_scroll_lock(&mut self, was_locked: bool) {
        let enabled = self.motion.scroll_lock_enabled;
        if enabled != was_locked {
            self.events.push(BlanketEvent::ScrollLockChanged { enabled });
        }
    }

    // -- Frame --------------------------------------------------------------

    /// Advance running springs by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let offset_settled = self.motion.content_offset.tick(dt);
        let height_settled = self
            .motion
            .custom_height
            .as_mut()
            .is_some_and(|h| h.tick(dt));

        if height_settled {
            if self.release_to_intrinsic {
                self.release_to_intrinsic = false;
                self.motion.custom_height = None;
                // Measurements taken under the override were of the frame.
                self.needs_resolve = true;
            }
            self.push_settled();
        }

        if offset_settled {
            if self.dismiss_pending {
                self.dismiss_pending = false;
                debug!("dismiss animation finished");
                self.events.push(BlanketEvent::DismissRequested);
                self.unload();
            } else {
                self.push_settled();
            }
        }
    }

    fn push_settled(&mut self) {
        self.events.push(BlanketEvent::Settled {
            offset: self.motion.offset(),
            height: self.motion.height(),
        });
    }

    /// Whether a spring is running (the host should keep ticking).
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.motion.content_offset.is_animating()
            || self
                .motion
                .custom_height
                .as_ref()
                .is_some_and(|h| h.is_animating())
    }

    /// Everything the renderer needs for this frame.
    #[must_use]
    pub fn frame(&self) -> BlanketFrame {
        BlanketFrame {
            offset: self.offset(),
            height: self.height(),
            scroll_lock_enabled: self.motion.scroll_lock_enabled,
            phase: self.phase(),
            presented: self.presented,
        }
    }

    /// Vertical translation of the sheet.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.motion.offset()
    }

    /// Height constraint; `None` sizes the sheet to its content.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        self.motion.height()
    }

    /// Whether inner scrolling is locked.
    #[must_use]
    pub fn is_scroll_lock_enabled(&self) -> bool {
        self.motion.scroll_lock_enabled
    }

    /// Push the scroll-lock state into a renderer's scrollable region.
    pub fn sync_scroll_lock<C: ScrollLockControl + ?Sized>(&self, control: &mut C) {
        control.set_scroll_lock_enabled(self.motion.scroll_lock_enabled);
    }

    /// Current presentation phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Whether the sheet is presented.
    #[must_use]
    pub fn is_presented(&self) -> bool {
        self.presented
    }

    /// The current resolution, once geometry is known.
    #[must_use]
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Take the notifications produced since the last call.
    pub fn drain_events(&mut self) -> Vec<BlanketEvent> {
        std::mem::take(&mut self.events)
    }
}

// ---------------------------------------------------------------------------
// ItemBlanket
// ---------------------------------------------------------------------------

/// A sheet presented for an item: it is open while an item is set and clears
/// the item when it dismisses itself.
#[derive(Debug)]
pub struct ItemBlanket<T> {
    controller: BlanketController,
    item: Option<T>,
}

impl<T> ItemBlanket<T> {
    /// Wrap `controller`, which should be dismissed.
    #[must_use]
    pub fn new(controller: BlanketController) -> Self {
        Self {
            controller,
            item: None,
        }
    }

    /// Present for `item`, returning the item it replaces.
    pub fn present(&mut self, item: T) -> Option<T> {
        let previous = self.item.replace(item);
        self.controller.present();
        previous
    }

    /// Dismiss now, returning the item.
    pub fn dismiss(&mut self) -> Option<T> {
        self.controller.dismiss();
        self.item.take()
    }

    /// The presented item.
    #[must_use]
    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    /// Advance animations; returns the item if the sheet dismissed itself.
    pub fn tick(&mut self, dt: Duration) -> Option<T> {
        self.controller.tick(dt);
        if self.controller.is_presented() {
            None
        } else {
            self.item.take()
        }
    }

    /// The underlying controller.
    #[must_use]
    pub fn controller(&self) -> &BlanketController {
        &self.controller
    }

    /// The underlying controller, for measurements and drags.
    pub fn controller_mut(&mut self) -> &mut BlanketController {
        &mut self.controller
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
