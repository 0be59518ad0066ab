#![forbid(unsafe_code)]

//! Core: detents, resolution, gestures, and the presentation lifecycle of a
//! bottom sheet.
//!
//! # Role in Blanket
//! `blanket-core` is the platform-independent half of a bottom-sheet overlay.
//! It takes measurements (content size, container size, safe-area inset),
//! declared detents and drag events, and produces what a renderer needs each
//! frame: a vertical offset, an optional height constraint, and a scroll-lock
//! flag.
//!
//! # Primary responsibilities
//! - **Detent resolution**: turn declared detents into concrete heights.
//! - **Nearest-detent search**: pick a landing detent from position and
//!   release velocity.
//! - **Gesture state machine**: decide per drag update whether the sheet
//!   resizes or moves, with rubber-banding at the extremes.
//! - **Lifecycle**: measure, place off-screen, then animate in.
//!
//! # How it fits in the system
//! Hosts own a [`BlanketController`], forward measurements and drags to it,
//! and read [`BlanketFrame`]s back. `blanket-harness` drives the same
//! controller from scripted traces.

pub mod animation;
pub mod blanket;
pub mod config;
pub mod detent;
pub mod geometry;
pub mod gesture;
pub mod lifecycle;
pub mod resolve;
pub mod rubber_band;

pub use blanket::{BlanketController, BlanketEvent, BlanketFrame, ItemBlanket};
pub use config::BlanketConfig;
pub use detent::{Detent, DetentParseError, ResolvedDetent};
pub use geometry::{Size, Vector};
pub use gesture::{GestureMode, ReleasePlan, ScrollLockControl};
pub use lifecycle::Phase;
pub use resolve::{InvalidDetents, ResolveInput, Resolution, ResolvedDetents, resolve};
