use rivesync::config::{GOOD_DISTANCE, NICE_DISTANCE, PERFECT_DISTANCE, TIME_SIG};
use rivesync::game::difficulty::Difficulty;
use rivesync::game::gameplay::Phase;
use rivesync::game::judgment::{classify, Judgment};
use rivesync::game::scores::{points_for, EndReason};
use rivesync::game::settings::Settings;
use rivesync::game::timing::PatternSource;
use rstest::rstest;

mod common;

// --- CLASSIFICATION WINDOWS ---
#[rstest]
#[case(0, Judgment::Perfect)]
#[case(PERFECT_DISTANCE - 1, Judgment::Perfect)]
#[case(PERFECT_DISTANCE, Judgment::Nice)] // Tie falls to the worse grade
#[case(NICE_DISTANCE - 1, Judgment::Nice)]
#[case(NICE_DISTANCE, Judgment::Good)]
#[case(GOOD_DISTANCE - 1, Judgment::Good)]
#[case(GOOD_DISTANCE, Judgment::Bad)]
#[case(200, Judgment::Bad)]
fn test_classify(#[case] distance: usize, #[case] expected: Judgment) {
    assert_eq!(classify(distance), expected, "distance {}", distance);
}

// --- FEEDBACK LABELS ---
#[rstest]
#[case(Judgment::Perfect, "PERFECT!")]
#[case(Judgment::Nice, "Nice!")]
#[case(Judgment::Good, "Good")]
#[case(Judgment::Bad, "Bad")]
#[case(Judgment::Miss, "Miss")]
fn test_judgment_label(#[case] judgment: Judgment, #[case] expected: &str) {
    assert_eq!(judgment.label(), expected);
}

// --- POINTS ---
#[rstest]
#[case(1, 4.0, 440)]
#[case(1, 1.5, 165)]
#[case(1, 1.0, 110)]
#[case(2, 1.5, 180)]
#[case(3, 4.0, 520)]
#[case(10, 1.0, 200)]
#[case(7, 1.5, 255)]
fn test_points_for(#[case] combo: u32, #[case] multiplier: f64, #[case] expected: u64) {
    assert_eq!(points_for(combo, multiplier), expected);
}

// --- SPEED ESCALATION CADENCE ---
#[rstest]
#[case(0, 0)]
#[case(1, 10)]
#[case(2, 5)]
#[case(3, 3)]
fn test_speed_escalations_per_grid(#[case] interval: u32, #[case] expected: usize) {
    let source = PatternSource::new(common::busy_pattern(), 0, 60);
    let settings = Settings {
        speed_increase_interval: interval,
        notes_increase_interval: 0,
        ..Settings::default()
    };
    let mut difficulty = Difficulty::new(&settings, TIME_SIG, Some(&source));
    // Frames far apart so the safe frame never holds an escalation back.
    let fired = (0..40u64)
        .filter(|&n| difficulty.on_note(n, n * 1_000, &source).speed)
        .count();
    assert_eq!(fired, expected);
}

// --- MISS CEILING ---
#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
fn test_misses_end_iff_ceiling_reached(#[case] max_misses: u32) {
    let mut state = common::new_state(Settings {
        max_misses,
        ..common::calm_settings()
    });
    let (mut input, start) = common::start(&mut state);
    for frame in start + 1..start + 600 {
        common::step(&mut state, &mut input, frame);
        if matches!(state.phase(), Phase::Ended { .. }) {
            break;
        }
    }

    match state.phase() {
        Phase::Ended { reason, .. } => {
            assert_ne!(max_misses, 0);
            assert_eq!(reason, EndReason::Misses);
            assert_eq!(state.ledger().consecutive_misses(), max_misses);
            assert_eq!(state.summary().end_code, Some(2));
        }
        phase => {
            assert_eq!(max_misses, 0, "still {:?}", phase);
            assert!(state.ledger().consecutive_misses() > 3);
            assert_eq!(state.summary().end_reason, None);
        }
    }
}
