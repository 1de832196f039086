//! Frame-level behaviour of the mapping orchestrator.

use std::sync::{Arc, Mutex};

use approx::{assert_abs_diff_eq, assert_relative_eq};

use handmap_core::{
    FrameObservation, GestureType, HandObservation, Handedness, InputKind, Landmark,
    INDEX_TIP, LANDMARK_COUNT, THUMB_TIP, WRIST,
};
use handmap_filter::SmoothingSpec;
use handmap_mapping::{
    CurveType, GestureMapping, HandSelector, InputSpec, MappingOrchestrator, MappingOutput,
    MappingState, MappingUpdate, OrchestratorConfig, OutputSpec, TimestampUnit,
};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn hand(handedness: Handedness, wrist: (f64, f64)) -> HandObservation {
    let mut landmarks = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
    landmarks[WRIST] = Landmark::new(wrist.0, wrist.1, 0.0);
    HandObservation::new(handedness, &landmarks, 0.9).unwrap()
}

fn pinching_hand(distance: f64) -> HandObservation {
    let mut hand = hand(Handedness::Right, (0.5, 0.8));
    hand.landmarks[THUMB_TIP] = Landmark::new(0.4, 0.4, 0.0);
    hand.landmarks[INDEX_TIP] = Landmark::new(0.4 + distance, 0.4, 0.0);
    hand
}

fn external_mapping(id: &str, smoothing: SmoothingSpec) -> GestureMapping {
    GestureMapping::new(
        id,
        InputSpec::new(InputKind::external("level")),
        OutputSpec::new("synth", id),
    )
    .with_smoothing(smoothing)
}

fn level_frame(index: usize, level: f64) -> FrameObservation {
    FrameObservation::new(index as f64 * FRAME_MS, Vec::new()).with_external("level", level)
}

fn capture(orchestrator: &mut MappingOrchestrator) -> Arc<Mutex<Vec<MappingOutput>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    orchestrator.on_output(move |output| sink.lock().unwrap().push(output.clone()));
    received
}

#[test]
fn test_pinch_converges_to_output_floor() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(
            GestureMapping::new(
                "pinch",
                InputSpec::new(GestureType::PinchDistance)
                    .with_hand(Handedness::Right)
                    .with_range(0.02, 0.15)
                    .with_curve(CurveType::SmoothStep),
                OutputSpec::new("synth", "cutoff").with_range(0.1, 1.0),
            )
            .with_smoothing(SmoothingSpec::adaptive(1.5, 0.01)),
        )
        .unwrap();

    let mut last = None;
    for i in 0..30 {
        let frame = FrameObservation::new(i as f64 * FRAME_MS, vec![pinching_hand(0.02)])
            .with_dimensions(1280, 720);
        let outputs = orchestrator.process(&frame);
        assert_eq!(outputs.len(), 1);
        last = Some(outputs[0].value);
    }

    assert_abs_diff_eq!(last.unwrap(), 0.1, epsilon = 1e-3);
    let state = orchestrator.state("pinch").unwrap();
    assert_abs_diff_eq!(state.raw_value, 0.02, epsilon = 1e-9);
    assert_eq!(state.last_update, 29.0 * FRAME_MS);
}

#[test]
fn test_callbacks_receive_returned_outputs() {
    let mut orchestrator = MappingOrchestrator::default();
    let first = capture(&mut orchestrator);
    let second = capture(&mut orchestrator);
    orchestrator
        .register_all([
            external_mapping("b", SmoothingSpec::Passthrough),
            external_mapping("a", SmoothingSpec::Passthrough),
        ])
        .unwrap();

    let returned = orchestrator.process(&level_frame(0, 0.25));

    let ids: Vec<&str> = returned.iter().map(|o| o.mapping_id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(*first.lock().unwrap(), returned);
    assert_eq!(*second.lock().unwrap(), returned);
    assert_eq!(returned[0].target, "synth");
    assert_eq!(returned[0].parameter, "b");
    assert_eq!(returned[0].timestamp, 0.0);
}

#[test]
fn test_disable_freezes_state_and_keeps_filter() {
    let mut orchestrator = MappingOrchestrator::default();
    let received = capture(&mut orchestrator);
    orchestrator
        .register(external_mapping("level", SmoothingSpec::Exponential { alpha: 0.5 }))
        .unwrap();

    orchestrator.process(&level_frame(0, 0.0));
    orchestrator.process(&level_frame(1, 0.2));
    let frozen = orchestrator.state("level").unwrap();
    assert_relative_eq!(frozen.smoothed_value, 0.1);

    orchestrator.set_enabled("level", false).unwrap();
    assert!(orchestrator.process(&level_frame(2, 1.0)).is_empty());
    assert_eq!(orchestrator.state("level").unwrap(), frozen);
    assert_eq!(received.lock().unwrap().len(), 2);

    orchestrator.set_enabled("level", true).unwrap();
    orchestrator.process(&level_frame(3, 0.3));
    // 0.5 * 0.3 + 0.5 * 0.1: history survived the pause
    assert_relative_eq!(orchestrator.state("level").unwrap().smoothed_value, 0.2);
}

#[test]
fn test_smoothing_change_while_disabled_starts_fresh() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(external_mapping("level", SmoothingSpec::Exponential { alpha: 0.5 }))
        .unwrap();

    orchestrator.process(&level_frame(0, 0.0));
    orchestrator.process(&level_frame(1, 0.2));

    orchestrator
        .update_spec(
            "level",
            MappingUpdate::new()
                .enabled(false)
                .smoothing(SmoothingSpec::Exponential { alpha: 0.6 }),
        )
        .unwrap();
    assert!(orchestrator.process(&level_frame(2, 1.0)).is_empty());

    orchestrator
        .update_spec("level", MappingUpdate::new().enabled(true))
        .unwrap();
    orchestrator.process(&level_frame(3, 0.3));
    assert_relative_eq!(orchestrator.state("level").unwrap().smoothed_value, 0.3);
}

#[test]
fn test_mappings_do_not_share_filters() {
    let exponential = SmoothingSpec::Exponential { alpha: 0.2 };
    let adaptive = SmoothingSpec::adaptive(1.0, 0.5);

    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register_all([
            external_mapping("slow", exponential),
            external_mapping("fast", adaptive),
        ])
        .unwrap();

    let mut slow_reference = exponential.build();
    let mut fast_reference = adaptive.build();
    let mut diverged = false;

    for i in 0..60 {
        let level = 0.5 + 0.3 * ((i * 7919) % 11) as f64 / 11.0 - 0.15;
        let frame = level_frame(i, level);
        let seconds = frame.timestamp / 1000.0;
        orchestrator.process(&frame);

        let slow = orchestrator.state("slow").unwrap().smoothed_value;
        let fast = orchestrator.state("fast").unwrap().smoothed_value;
        assert_relative_eq!(slow, slow_reference.apply(level, seconds), epsilon = 1e-12);
        assert_relative_eq!(fast, fast_reference.apply(level, seconds), epsilon = 1e-12);
        diverged |= (slow - fast).abs() > 1e-3;
    }

    assert!(diverged);
}

#[test]
fn test_same_gesture_mappings_keep_separate_filters() {
    let exponential = SmoothingSpec::Exponential { alpha: 0.3 };
    let averaged = SmoothingSpec::MovingAverage { window: 6 };

    let mut orchestrator = MappingOrchestrator::default();
    for (id, smoothing) in [("pinch_ema", exponential), ("pinch_avg", averaged)] {
        orchestrator
            .register(
                GestureMapping::new(
                    id,
                    InputSpec::new(GestureType::PinchDistance)
                        .with_hand(Handedness::Right)
                        .with_range(0.02, 0.15),
                    OutputSpec::new("synth", id),
                )
                .with_smoothing(smoothing),
            )
            .unwrap();
    }

    let mut ema_reference = exponential.build();
    let mut avg_reference = averaged.build();
    let mut diverged = false;

    for i in 0..60 {
        let jitter = 0.02 * ((i * 7919) % 7) as f64 / 7.0;
        let hands = vec![pinching_hand(0.06 + jitter)];
        let frame = FrameObservation::new(i as f64 * FRAME_MS, hands);
        orchestrator.process(&frame);

        let ema = orchestrator.state("pinch_ema").unwrap();
        let avg = orchestrator.state("pinch_avg").unwrap();
        assert_eq!(ema.raw_value, avg.raw_value);

        let seconds = frame.timestamp / 1000.0;
        let expected_ema = ema_reference.apply(ema.raw_value, seconds);
        let expected_avg = avg_reference.apply(avg.raw_value, seconds);
        assert_relative_eq!(ema.smoothed_value, expected_ema, epsilon = 1e-12);
        assert_relative_eq!(avg.smoothed_value, expected_avg, epsilon = 1e-12);
        diverged |= (ema.output_value - avg.output_value).abs() > 1e-3;
    }

    assert!(diverged);
}

#[test]
fn test_update_without_smoothing_change_keeps_filter_history() {
    let smoothing = SmoothingSpec::Exponential { alpha: 0.5 };
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator.register(external_mapping("level", smoothing)).unwrap();

    orchestrator.process(&level_frame(0, 0.0));
    orchestrator.process(&level_frame(1, 0.2));

    let update = MappingUpdate::new()
        .output(OutputSpec::new("mixer", "gain").with_range(0.0, 10.0))
        .smoothing(smoothing);
    orchestrator.update_spec("level", update).unwrap();

    let outputs = orchestrator.process(&level_frame(2, 0.3));
    // 0.5 * 0.3 + 0.5 * 0.1, not a fresh 0.3
    let state = orchestrator.state("level").unwrap();
    assert_relative_eq!(state.smoothed_value, 0.2);
    assert_eq!(outputs[0].target, "mixer");
    assert_relative_eq!(outputs[0].value, 2.0);
}

#[test]
fn test_missing_hand_skips_mapping() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(GestureMapping::new(
            "left_x",
            InputSpec::new(GestureType::WristPositionX).with_hand(Handedness::Left),
            OutputSpec::new("synth", "pan"),
        ))
        .unwrap();

    let right_only = FrameObservation::new(0.0, vec![hand(Handedness::Right, (0.7, 0.5))]);
    assert!(orchestrator.process(&right_only).is_empty());
    assert_eq!(orchestrator.state("left_x").unwrap(), MappingState::default());

    let empty = FrameObservation::new(FRAME_MS, Vec::new());
    assert!(orchestrator.process(&empty).is_empty());

    let both = FrameObservation::new(
        2.0 * FRAME_MS,
        vec![hand(Handedness::Right, (0.7, 0.5)), hand(Handedness::Left, (0.3, 0.5))],
    );
    let outputs = orchestrator.process(&both);
    assert_eq!(outputs.len(), 1);
    assert_relative_eq!(outputs[0].value, 0.3);
}

#[test]
fn test_any_selector_uses_first_hand() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(GestureMapping::new(
            "x",
            InputSpec::new(GestureType::WristPositionX).with_hand(HandSelector::Any),
            OutputSpec::new("synth", "pan"),
        ))
        .unwrap();

    let frame = FrameObservation::new(
        0.0,
        vec![hand(Handedness::Left, (0.3, 0.5)), hand(Handedness::Right, (0.7, 0.5))],
    );
    orchestrator.process(&frame);
    assert_relative_eq!(orchestrator.state("x").unwrap().raw_value, 0.3);

    let swapped = FrameObservation::new(
        FRAME_MS,
        vec![hand(Handedness::Right, (0.7, 0.5)), hand(Handedness::Left, (0.3, 0.5))],
    );
    orchestrator.process(&swapped);
    assert_relative_eq!(orchestrator.state("x").unwrap().raw_value, 0.7);
}

#[test]
fn test_velocity_mappings_share_landmark_cache() {
    let mut orchestrator = MappingOrchestrator::default();
    for (id, gesture) in [("vx", GestureType::VelocityX), ("vy", GestureType::VelocityY)] {
        orchestrator
            .register(GestureMapping::new(
                id,
                InputSpec::new(gesture)
                    .with_hand(Handedness::Right)
                    .with_range(0.0, 0.002),
                OutputSpec::new("synth", id),
            ))
            .unwrap();
    }

    let start = FrameObservation::new(0.0, vec![hand(Handedness::Right, (0.5, 0.5))]);
    orchestrator.process(&start);
    assert_eq!(orchestrator.state("vx").unwrap().raw_value, 0.0);
    assert_eq!(orchestrator.state("vy").unwrap().raw_value, 0.0);

    // 100 ms later the wrist moved +0.1 in x and -0.05 in y
    let moved = FrameObservation::new(100.0, vec![hand(Handedness::Right, (0.6, 0.45))]);
    orchestrator.process(&moved);
    let vx = orchestrator.state("vx").unwrap();
    let vy = orchestrator.state("vy").unwrap();
    assert_relative_eq!(vx.raw_value, 0.001, epsilon = 1e-12);
    assert_relative_eq!(vy.raw_value, 0.0005, epsilon = 1e-12);
    assert_relative_eq!(vx.output_value, 0.5, epsilon = 1e-9);
}

#[test]
fn test_velocity_uses_timestamp_unit_of_frames() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(GestureMapping::new(
            "vx",
            InputSpec::new(GestureType::VelocityX)
                .with_hand(Handedness::Right)
                .with_range(0.0, 0.01),
            OutputSpec::new("synth", "vx"),
        ))
        .unwrap();

    let start = FrameObservation::new(0.0, vec![hand(Handedness::Right, (0.5, 0.5))]);
    let moved = FrameObservation::new(100.0, vec![hand(Handedness::Right, (0.6, 0.5))]);
    orchestrator.process(&start);
    let outputs = orchestrator.process(&moved);

    // 0.1 over 100 ms is 0.001 per ms, a tenth of the input range
    assert_relative_eq!(outputs[0].value, 0.1, epsilon = 1e-9);
}

#[test]
fn test_velocity_is_zero_for_repeated_timestamp() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(GestureMapping::new(
            "vx",
            InputSpec::new(GestureType::VelocityX).with_hand(Handedness::Left),
            OutputSpec::new("synth", "vx"),
        ))
        .unwrap();

    let first = FrameObservation::new(50.0, vec![hand(Handedness::Left, (0.2, 0.5))]);
    let repeated = FrameObservation::new(50.0, vec![hand(Handedness::Left, (0.4, 0.5))]);
    orchestrator.process(&first);
    orchestrator.process(&repeated);
    assert_eq!(orchestrator.state("vx").unwrap().raw_value, 0.0);
}

#[test]
fn test_seconds_timestamps() {
    let config = OrchestratorConfig::default().with_timestamp_unit(TimestampUnit::Seconds);
    let mut orchestrator = MappingOrchestrator::new(config);
    orchestrator
        .register(GestureMapping::new(
            "vx",
            InputSpec::new(GestureType::VelocityX)
                .with_hand(Handedness::Right)
                .with_range(0.0, 2.0),
            OutputSpec::new("synth", "vx"),
        ))
        .unwrap();

    let start = FrameObservation::new(1.0, vec![hand(Handedness::Right, (0.5, 0.5))]);
    let moved = FrameObservation::new(1.5, vec![hand(Handedness::Right, (0.6, 0.5))]);
    orchestrator.process(&start);
    orchestrator.process(&moved);
    assert_relative_eq!(orchestrator.state("vx").unwrap().raw_value, 0.2, epsilon = 1e-9);
}

#[test]
fn test_external_input() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(GestureMapping::new(
            "ext",
            InputSpec::new(InputKind::external("level"))
                .with_range(0.0, 10.0)
                .with_curve(CurveType::Exponential),
            OutputSpec::new("fx", "mix").with_range(0.0, 100.0),
        ))
        .unwrap();

    let frame = FrameObservation::new(0.0, Vec::new()).with_external("level", 5.0);
    let outputs = orchestrator.process(&frame);
    assert_eq!(outputs.len(), 1);
    assert_relative_eq!(outputs[0].value, 25.0);

    let missing = FrameObservation::new(FRAME_MS, Vec::new()).with_external("other", 1.0);
    assert!(orchestrator.process(&missing).is_empty());
    assert_relative_eq!(orchestrator.state("ext").unwrap().output_value, 25.0);

    let poisoned =
        FrameObservation::new(2.0 * FRAME_MS, Vec::new()).with_external("level", f64::NAN);
    assert!(orchestrator.process(&poisoned).is_empty());
    assert_relative_eq!(orchestrator.state("ext").unwrap().raw_value, 5.0);
}

#[test]
fn test_confidence_gate() {
    let config = OrchestratorConfig::default().with_min_hand_confidence(0.5);
    let mut orchestrator = MappingOrchestrator::new(config);
    orchestrator
        .register(GestureMapping::new(
            "x",
            InputSpec::new(GestureType::WristPositionX),
            OutputSpec::new("synth", "pan"),
        ))
        .unwrap();

    let mut weak = hand(Handedness::Left, (0.3, 0.5));
    weak.confidence = 0.3;
    let strong = hand(Handedness::Right, (0.7, 0.5));

    assert!(orchestrator
        .process(&FrameObservation::new(0.0, vec![weak.clone()]))
        .is_empty());
    assert_eq!(orchestrator.state("x").unwrap(), MappingState::default());

    // The weak hand is ignored, so "any" falls through to the next hand
    orchestrator.process(&FrameObservation::new(FRAME_MS, vec![weak, strong]));
    assert_relative_eq!(orchestrator.state("x").unwrap().raw_value, 0.7);
}

#[test]
fn test_invert_end_to_end() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register(GestureMapping::new(
            "inv",
            InputSpec::new(InputKind::external("level")).with_range(0.02, 0.15),
            OutputSpec::new("synth", "cutoff")
                .with_range(0.1, 1.0)
                .with_invert(true),
        ))
        .unwrap();

    let low = orchestrator.process(&level_frame(0, 0.0));
    assert_abs_diff_eq!(low[0].value, 1.0, epsilon = 1e-12);
    let high = orchestrator.process(&level_frame(1, 0.5));
    assert_abs_diff_eq!(high[0].value, 0.1, epsilon = 1e-12);
}

#[test]
fn test_reset_clears_filters_state_and_history() {
    let mut orchestrator = MappingOrchestrator::default();
    orchestrator
        .register_all([
            external_mapping("level", SmoothingSpec::Exponential { alpha: 0.5 }),
            GestureMapping::new(
                "vx",
                InputSpec::new(GestureType::VelocityX).with_hand(Handedness::Right),
                OutputSpec::new("synth", "vx"),
            ),
        ])
        .unwrap();
    orchestrator.set_enabled("vx", false).unwrap();

    orchestrator.process(&level_frame(0, 0.8));
    orchestrator.process(&level_frame(1, 0.4));
    orchestrator.reset();

    assert!(orchestrator
        .states()
        .iter()
        .all(|(_, state)| *state == MappingState::default()));
    assert!(!orchestrator.mapping("vx").unwrap().enabled);

    // A fresh exponential filter returns its first input unchanged
    orchestrator.process(&level_frame(2, 0.1));
    assert_relative_eq!(orchestrator.state("level").unwrap().smoothed_value, 0.1);

    // The landmark cache is gone too: velocity starts from zero again
    orchestrator.set_enabled("vx", true).unwrap();
    let frame = FrameObservation::new(3.0 * FRAME_MS, vec![hand(Handedness::Right, (0.2, 0.5))]);
    orchestrator.process(&frame);
    orchestrator.reset();
    let moved = FrameObservation::new(4.0 * FRAME_MS, vec![hand(Handedness::Right, (0.9, 0.5))]);
    orchestrator.process(&moved);
    assert_eq!(orchestrator.state("vx").unwrap().raw_value, 0.0);
}

#[test]
fn test_independent_orchestrators_on_threads() {
    let handles: Vec<_> = [0.2, 0.6]
        .into_iter()
        .map(|level| {
            let mut orchestrator = MappingOrchestrator::default();
            orchestrator
                .register(external_mapping("level", SmoothingSpec::adaptive(1.0, 0.1)))
                .unwrap();
            std::thread::spawn(move || {
                for i in 0..60 {
                    orchestrator.process(&level_frame(i, level));
                }
                orchestrator.state("level").unwrap().smoothed_value
            })
        })
        .collect();

    let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_relative_eq!(results[0], 0.2, epsilon = 1e-9);
    assert_relative_eq!(results[1], 0.6, epsilon = 1e-9);
}
