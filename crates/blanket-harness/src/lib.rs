#![forbid(unsafe_code)]

//! Replay harness for `blanket-core`.
//!
//! Drives a [`blanket_core::BlanketController`] from scripted JSON traces and
//! prints the resulting frames as JSONL, so gesture behaviour can be inspected
//! and diffed without a renderer.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod trace;

pub use cli::{run, run_from_env};
pub use error::{HarnessError, Result};
pub use trace::{FrameRecord, TraceEvent, replay};
