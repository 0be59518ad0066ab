//! Replaying recorded traces end to end.

use std::path::PathBuf;

use blanket_core::{BlanketConfig, BlanketEvent, GestureMode, Phase, ReleasePlan};
use blanket_harness::cli::{Cli, Commands, ReplayArgs};
use blanket_harness::trace::{TraceEvent, load_trace, replay};
use blanket_harness::{FrameRecord, config};
use proptest::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("traces")
        .join(name)
}

fn records() -> Vec<FrameRecord> {
    let events = load_trace(fixture("resize_and_dismiss.json")).unwrap();
    replay(&events, &BlanketConfig::default())
}

#[test]
fn entrance_places_then_animates() {
    let records = records();
    assert_eq!(records.len(), 15);

    let loaded = &records[5];
    assert_eq!(loaded.frame.phase, Phase::ContentLoaded);
    assert_eq!(loaded.frame.offset, 334.0);

    let displaying = &records[6];
    assert_eq!(displaying.frame.phase, Phase::Displaying);

    let settled = &records[7];
    assert_eq!(settled.frame.offset, 0.0);
    assert!(settled
        .events
        .iter()
        .any(|e| matches!(e, BlanketEvent::Settled { .. })));
}

#[test]
fn stretch_snaps_to_middle_detent() {
    let records = records();
    assert_eq!(records[8].mode, Some(GestureMode::Stretching));
    assert_eq!(records[8].frame.height, Some(400.0));

    match records[9].plan {
        Some(ReleasePlan::Snap {
            detent,
            release_to_intrinsic,
            ..
        }) => {
            assert_eq!(detent.offset, 385.0);
            assert!(!release_to_intrinsic);
        }
        other => panic!("unexpected plan: {other:?}"),
    }
    assert_eq!(records[10].frame.height, Some(385.0));
}

#[test]
fn drag_down_dismisses() {
    let records = records();
    assert_eq!(records[11].mode, Some(GestureMode::Moving));
    assert_eq!(records[11].frame.height, None);
    assert_eq!(records[12].frame.offset, 120.0);
    assert!(records[13].plan.is_some_and(|p| p.dismisses()));

    let last = records.last().unwrap();
    assert!(!last.frame.presented);
    assert_eq!(last.frame.phase, Phase::ContentUnloaded);
    assert_eq!(
        last.events[last.events.len() - 3..],
        [
            BlanketEvent::DismissRequested,
            BlanketEvent::PhaseChanged {
                phase: Phase::ContentUnloaded
            },
            BlanketEvent::Dismissed,
        ]
    );
}

#[test]
fn forgiving_config_keeps_sheet_open() {
    let config = config::load(fixture("soft_springs.toml")).unwrap();
    assert_eq!(config.dismiss_offset_threshold, 150.0);

    let events = load_trace(fixture("resize_and_dismiss.json")).unwrap();
    let records = replay(&events, &config);
    assert!(records[13].plan.is_some_and(|p| !p.dismisses()));
    let last = records.last().unwrap();
    assert!(last.frame.presented);
    assert_eq!(last.frame.offset, 0.0);
}

#[test]
fn cli_replay_writes_jsonl() {
    let mut out = Vec::new();
    blanket_harness::run(
        Cli {
            config: None,
            log_filter: None,
            json_logs: false,
            command: Commands::Replay(ReplayArgs {
                trace: fixture("resize_and_dismiss.json"),
            }),
        },
        &mut out,
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    let parsed: Vec<FrameRecord> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed, records());
}

#[test]
fn cli_reports_missing_trace() {
    let dir = tempfile::tempdir().unwrap();
    let err = blanket_harness::run(
        Cli {
            config: None,
            log_filter: None,
            json_logs: false,
            command: Commands::Replay(ReplayArgs {
                trace: dir.path().join("absent.json"),
            }),
        },
        &mut Vec::new(),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

// ── Properties ──────────────────────────────────────────────────────────

fn gesture_strategy() -> impl Strategy<Value = Vec<TraceEvent>> {
    let step = prop_oneof![
        (-900.0f64..900.0).prop_map(|dy| TraceEvent::Drag { dy }),
        (-3000.0f64..3000.0).prop_map(|velocity| TraceEvent::Release { velocity }),
        (1u32..30).prop_map(|frames| TraceEvent::Tick { ms: 16, frames }),
        Just(TraceEvent::Flush),
        (50.0f64..900.0).prop_map(|height| TraceEvent::Content {
            width: 390.0,
            height
        }),
    ];
    prop::collection::vec(step, 0..40).prop_map(|steps| {
        let mut events = vec![
            TraceEvent::Present,
            TraceEvent::Container {
                width: 390.0,
                height: 800.0,
            },
            TraceEvent::Content {
                width: 390.0,
                height: 300.0,
            },
            TraceEvent::Detents {
                detents: vec![
                    blanket_core::Detent::CONTENT,
                    blanket_core::Detent::fraction(0.5),
                ],
            },
            TraceEvent::Flush,
            TraceEvent::Flush,
        ];
        events.extend(steps);
        events
    })
}

proptest! {
    #[test]
    fn replay_is_deterministic(events in gesture_strategy()) {
        let config = BlanketConfig::default();
        prop_assert_eq!(replay(&events, &config), replay(&events, &config));
    }

    #[test]
    fn frames_stay_finite(events in gesture_strategy()) {
        for record in replay(&events, &BlanketConfig::default()) {
            prop_assert!(record.frame.offset.is_finite(), "{record:?}");
            prop_assert!(record.frame.height.is_none_or(f64::is_finite), "{record:?}");
        }
    }
}
