use rivesync::config::{END_OF_TRACK, HIT_LINE};
use rivesync::core::input::Lane;
use rivesync::game::gameplay::Phase;
use rivesync::game::judgment::Judgment;
use rivesync::game::lanes::TickKind;

mod common;

// Frames an object needs from the leading slot to the hit line at 5 px/f.
const TRAVEL: u64 = ((END_OF_TRACK - HIT_LINE) / 5) as u64;

#[test]
fn perfect_streak_builds_combo_score() {
    let mut state = common::new_state(common::calm_settings());
    let (mut input, start) = common::start(&mut state);

    // Note n spawns 6 frames apart; each row of track "a" owns one lane.
    let lanes = [
        Lane::Left,
        Lane::Down,
        Lane::Up,
        Lane::Down,
        Lane::Left,
        Lane::Right,
        Lane::Up,
        Lane::Right,
    ];
    for (note, lane) in lanes.iter().enumerate() {
        for edge in common::press(start + 6 * note as u64 + TRAVEL, *lane) {
            input.queue_edge(edge);
        }
    }

    let last = start + 6 * 7 + TRAVEL;
    for frame in start + 1..=last {
        common::step(&mut state, &mut input, frame);
    }

    let summary = state.summary();
    assert_eq!(summary.n_perfect, 8);
    assert_eq!(summary.n_bad + summary.n_miss, 0);
    assert_eq!(summary.max_combo, 8);
    // sum over k = 1..=8 of (10 + k) * 10 * 4
    assert_eq!(summary.score, 4640);
    assert_eq!(summary.max_combo_score, 720);
    assert_eq!(summary.frame, last);
    assert_eq!(state.feedback(Lane::Right.index()).last, Some(Judgment::Perfect));
}

#[test]
fn early_press_is_good_and_late_objects_still_miss() {
    let mut state = common::new_state(common::calm_settings());
    let (mut input, start) = common::start(&mut state);

    // Three frames early: 15 slots above the hit line.
    for edge in common::press(start + TRAVEL - 3, Lane::Left) {
        input.queue_edge(edge);
    }
    for frame in start + 1..=start + TRAVEL + 10 {
        common::step(&mut state, &mut input, frame);
    }
    assert_eq!(state.summary().n_good, 1);
    assert_eq!(state.ledger().score(), 110);

    // Note 1 (lane Down) was never pressed and leaves the field.
    for frame in start + TRAVEL + 11..=start + 6 + 52 {
        common::step(&mut state, &mut input, frame);
    }
    assert_eq!(state.summary().n_miss, 1);
    assert_eq!(state.ledger().combo_moves(), 0);
    assert_eq!(state.feedback(Lane::Down.index()).last, Some(Judgment::Miss));
}

#[test]
fn ticks_follow_beats_and_active_notes() {
    let mut state = common::new_state(common::calm_settings());
    let (mut input, start) = common::start(&mut state);
    for frame in start + 1..=start + 12 {
        common::step(&mut state, &mut input, frame);
    }
    // Notes 0, 1 and 2 are all active; only note 0 starts a beat.
    assert_eq!(state.tick_positions(TickKind::HitTick).len(), 3);
    assert_eq!(state.tick_positions(TickKind::BeatTick).len(), 1);
    assert_eq!(state.phase(), Phase::Running);
}

#[test]
fn speed_up_raises_banner_and_summary_speed() {
    let mut state = common::new_state(rivesync::game::settings::Settings {
        speed_increase_interval: 1,
        ..common::calm_settings()
    });
    let (mut input, start) = common::start(&mut state);
    // Note 3 closes the first beat.
    for frame in start + 1..=start + 18 {
        common::step(&mut state, &mut input, frame);
    }
    let banner = state.banner(start + 18).map(|b| b.banner());
    assert_eq!(banner, Some("MORE SPEED!"));
    assert!(state.summary().speed > 5.0);
    assert_eq!(state.speed().current(), 5.0);
}
