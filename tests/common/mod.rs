#![allow(dead_code)]

use rivesync::core::input::{self, Button, InputEdge, InputState, Lane};
use rivesync::game::gameplay::{self, Phase, State};
use rivesync::game::parsing::pattern::{self, Pattern};
use rivesync::game::settings::Settings;
use rivesync::game::timing::PatternSource;

/// 150 BPM at 60 fps: one note index every 6 frames. Four rows so every lane gets traffic.
pub const BUSY_PATTERN: &str = r#"{
    "name": "busy", "bpm": 150, "length": 8,
    "tracks": [
        { "name": "a", "rows": ["x...x...", "..x...x.", ".x.x....", ".....x.x"] },
        { "name": "b", "rows": ["xx..xx..", "..xx..xx"] }
    ]
}"#;

pub fn busy_pattern() -> Pattern {
    pattern::parse_pattern_str(BUSY_PATTERN).unwrap()
}

/// Settings with difficulty escalation switched off and no miss ceiling.
pub fn calm_settings() -> Settings {
    Settings {
        initial_speed: 5.0,
        notes_interval: 1,
        notes_increase_interval: 0,
        speed_increase_interval: 0,
        max_misses: 0,
        loops: 0,
        ..Settings::default()
    }
}

pub fn new_state(settings: Settings) -> State {
    let source = PatternSource::new(busy_pattern(), settings.loops, settings.target_fps);
    gameplay::init(settings, Some(Box::new(source)))
}

pub fn press(frame: u64, lane: Lane) -> [InputEdge; 2] {
    [
        InputEdge::press(frame, Button::Lane(lane)),
        InputEdge::release(frame + 1, Button::Lane(lane)),
    ]
}

pub fn step(state: &mut State, input: &mut InputState, frame: u64) {
    input.begin_frame(frame);
    gameplay::update(state, frame, input);
}

/// Presses Right on frame 0 and steps until the run is live. Returns the input
/// state and the frame the run started on.
pub fn start(state: &mut State) -> (InputState, u64) {
    let mut input = input::init_state();
    for edge in press(0, Lane::Right) {
        input.queue_edge(edge);
    }
    let mut frame = 0;
    while state.phase() != Phase::Running {
        step(state, &mut input, frame);
        frame += 1;
        assert!(frame < 100, "run never started");
    }
    (input, state.start_frame())
}
