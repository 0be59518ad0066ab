//! Scripted input traces and their replay.
//!
//! A trace is a JSON array of [`TraceEvent`]s, the same calls a host would
//! make on a [`BlanketController`]:
//!
//! ```json
//! [
//!   { "op": "present" },
//!   { "op": "container", "height": 800 },
//!   { "op": "content", "height": 300 },
//!   { "op": "detents", "detents": ["content", "fraction:0.5"] },
//!   { "op": "flush" },
//!   { "op": "tick", "ms": 16, "frames": 60 }
//! ]
//! ```
//!
//! Replay produces one [`FrameRecord`] per event.
//!
//! # Invariants
//!
//! 1. Replay is deterministic: the same trace and config always produce the
//!    same records.
//! 2. Events are applied in order; `flush` is never implied.

use std::path::Path;
use std::time::Duration;

use blanket_core::{
    BlanketConfig, BlanketController, BlanketEvent, BlanketFrame, Detent, GestureMode,
    ReleasePlan, Size, Vector,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HarnessError, Result};

/// Width reported when a trace only gives heights.
const DEFAULT_WIDTH: f64 = 390.0;

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn one() -> u32 {
    1
}

/// One scripted host call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Container measured.
    Container {
        #[serde(default = "default_width")]
        width: f64,
        height: f64,
    },
    /// Content measured.
    Content {
        #[serde(default = "default_width")]
        width: f64,
        height: f64,
    },
    /// Bottom safe-area inset.
    SafeArea { bottom: f64 },
    /// Declared detents in textual form.
    Detents { detents: Vec<Detent> },
    /// Presented flag set.
    Present,
    /// Presented flag cleared.
    Dismiss,
    /// Drag update with total vertical translation.
    Drag { dy: f64 },
    /// Drag end with vertical release velocity.
    Release { velocity: f64 },
    /// End of an update cycle.
    Flush,
    /// `frames` animation ticks of `ms` each.
    Tick {
        ms: u64,
        #[serde(default = "one")]
        frames: u32,
    },
}

impl TraceEvent {
    /// The `op` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Container { .. } => "container",
            Self::Content { .. } => "content",
            Self::SafeArea { .. } => "safe_area",
            Self::Detents { .. } => "detents",
            Self::Present => "present",
            Self::Dismiss => "dismiss",
            Self::Drag { .. } => "drag",
            Self::Release { .. } => "release",
            Self::Flush => "flush",
            Self::Tick { .. } => "tick",
        }
    }
}

/// Controller state after one trace event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Zero-based index into the trace.
    pub step: usize,
    /// The event's `op` tag.
    pub op: String,
    #[serde(flatten)]
    pub frame: BlanketFrame,
    /// Mode reported by a `drag`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GestureMode>,
    /// Plan chosen by a `release`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<ReleasePlan>,
    /// Notifications raised while applying the event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<BlanketEvent>,
}

/// Parse a JSON trace.
pub fn parse_trace(json: &str) -> Result<Vec<TraceEvent>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a JSON trace file.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| HarnessError::read_file(path, e))?;
    parse_trace(&json)
}

/// Feed `events` through a fresh controller.
#[must_use]
pub fn replay(events: &[TraceEvent], config: &BlanketConfig) -> Vec<FrameRecord> {
    let mut sheet = BlanketController::new(config.clone());
    let mut records = Vec::with_capacity(events.len());

    for (step, event) in events.iter().enumerate() {
        let mut mode = None;
        let mut plan = None;

        match event {
            TraceEvent::Container { width, height } => {
                sheet.set_container_size(Size::new(*width, *height));
            }
            TraceEvent::Content { width, height } => {
                sheet.set_content_size(Size::new(*width, *height));
            }
            TraceEvent::SafeArea { bottom } => sheet.set_safe_area_bottom(*bottom),
            TraceEvent::Detents { detents } => sheet.set_detents(detents.iter().copied()),
            TraceEvent::Present => sheet.present(),
            TraceEvent::Dismiss => sheet.dismiss(),
            TraceEvent::Drag { dy } => mode = sheet.on_change(Vector::vertical(*dy)),
            TraceEvent::Release { velocity } => plan = sheet.on_end(Vector::vertical(*velocity)),
            TraceEvent::Flush => sheet.flush(),
            TraceEvent::Tick { ms, frames } => {
                let dt = Duration::from_millis(*ms);
                for _ in 0..*frames {
                    sheet.tick(dt);
                }
            }
        }

        let record = FrameRecord {
            step,
            op: event.name().to_string(),
            frame: sheet.frame(),
            mode,
            plan,
            events: sheet.drain_events(),
        };
        debug!(step, op = %record.op, offset = record.frame.offset, "replayed");
        records.push(record);
    }

    info!(
        steps = records.len(),
        presented = sheet.is_presented(),
        "replay finished"
    );
    records
}
