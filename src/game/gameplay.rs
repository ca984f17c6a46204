use crate::config::{
    ATTRACT_SPAWN_FRAMES, ATTRACT_SPEED, MAX_COLS, MAX_START_DELAY_FRAMES, TIME_SIG,
};
use crate::core::input::InputState;
use crate::game::difficulty::{Difficulty, Escalation};
use crate::game::judgment::{self, LaneFeedback};
use crate::game::lanes::{LaneTable, TickKind};
use crate::game::scores::{EndReason, Ledger, RunSummary};
use crate::game::scroll::SpeedState;
use crate::game::settings::Settings;
use crate::game::timing::{BeatSource, NoteCursor};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Keeps the attract animation off the stream that draws the start delay.
const AMBIENT_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Attract animation until the first press.
    Waiting,
    /// The run starts on frame `until`.
    WaitingRandomDelay { until: u64 },
    Running,
    Ended { reason: EndReason, frame: u64 },
}

pub struct State {
    settings: Settings,
    source: Option<Box<dyn BeatSource>>,
    phase: Phase,

    lanes: LaneTable,
    difficulty: Difficulty,
    ledger: Ledger,
    feedback: [LaneFeedback; MAX_COLS],
    last_note: Option<u64>,
    start_frame: u64,

    start_rng: StdRng,
    ambient_rng: StdRng,
    ambient_speed: SpeedState,

    summary: RunSummary,
    log_timer: u32,
}

pub fn init(settings: Settings, source: Option<Box<dyn BeatSource>>) -> State {
    let settings = settings.normalized();
    if source.is_none() {
        info!("No beat source loaded; the run will end as soon as it starts.");
    }
    let difficulty = Difficulty::new(&settings, TIME_SIG, source.as_deref());
    let ledger = Ledger::new(settings.multipliers);
    let summary = RunSummary::from_ledger(
        &ledger,
        0,
        difficulty.notes_interval(),
        difficulty.speed().next(),
        settings.show_stats,
        None,
    );

    State {
        lanes: LaneTable::new(settings.n_cols),
        start_rng: StdRng::seed_from_u64(settings.seed),
        ambient_rng: StdRng::seed_from_u64(settings.seed ^ AMBIENT_STREAM),
        ambient_speed: SpeedState::new(ATTRACT_SPEED),
        phase: Phase::Waiting,
        difficulty,
        ledger,
        feedback: [LaneFeedback::default(); MAX_COLS],
        last_note: None,
        start_frame: 0,
        summary,
        log_timer: 0,
        source,
        settings,
    }
}

/// Runs one frame. `input` must already have been advanced to `frame`.
pub fn update(state: &mut State, frame: u64, input: &InputState) {
    match state.phase {
        Phase::Waiting => {
            update_attract(state, frame, input);
            if input.any_pressed() {
                let delay = state.start_rng.random_range(0..MAX_START_DELAY_FRAMES);
                let until = frame + 1 + delay;
                info!("Start pressed on frame {}, run begins on frame {}.", frame, until);
                state.phase = Phase::WaitingRandomDelay { until };
            }
        }
        Phase::WaitingRandomDelay { until } => {
            if input.quit().pressed {
                info!("Quit pressed before the run began.");
                end_run(state, EndReason::Quit, frame);
            } else if frame < until {
                update_attract(state, frame, input);
            } else {
                start_run(state, frame);
                update_running(state, frame, input);
            }
        }
        Phase::Running => update_running(state, frame, input),
        Phase::Ended { .. } => {}
    }

    if !matches!(state.phase, Phase::Ended { .. }) {
        refresh_summary(state, frame, None);
    }
}

fn update_attract(state: &mut State, frame: u64, input: &InputState) {
    if frame % ATTRACT_SPAWN_FRAMES == 0 {
        let lane = state.ambient_rng.random_range(0..state.lanes.n_cols());
        state.lanes.spawn(lane, frame);
    }
    state.lanes.advance(frame, &state.ambient_speed);
    for (lane, feedback) in state.feedback.iter_mut().enumerate() {
        feedback.held = input.lane(lane).held;
    }
}

fn start_run(state: &mut State, frame: u64) {
    state.lanes.clear();
    state.difficulty = Difficulty::new(&state.settings, TIME_SIG, state.source.as_deref());
    state.ledger = Ledger::new(state.settings.multipliers);
    state.feedback = [LaneFeedback::default(); MAX_COLS];
    state.last_note = None;
    state.start_frame = frame;
    state.log_timer = 0;

    let frames_until_mark = state.difficulty.frames_until_mark();
    if let Some(source) = state.source.as_deref_mut() {
        source.seek(frame as i64);
        source.set_start_offset(frames_until_mark as i64 + state.settings.frame_offset);
        info!(
            "Run started on frame {}: first note reaches the hit line after {} frames, audio starts on frame {}.",
            frame,
            frames_until_mark,
            source.audio_start_frame()
        );
    }
    state.phase = Phase::Running;
}

fn end_run(state: &mut State, reason: EndReason, frame: u64) {
    state.phase = Phase::Ended { reason, frame };
    state.ledger.finalize();
    refresh_summary(state, frame, Some(reason));
    info!("Run ended on frame {}: {:?}", frame, reason);
    info!("{}", state.summary.to_outcard());
}

#[inline(always)]
fn misses_exhausted(state: &State) -> bool {
    state.settings.max_misses != 0
        && state.ledger.consecutive_misses() >= state.settings.max_misses
}

fn update_running(state: &mut State, frame: u64, input: &InputState) {
    if input.quit().pressed {
        end_run(state, EndReason::Quit, frame);
        return;
    }
    if misses_exhausted(state) {
        end_run(state, EndReason::Misses, frame);
        return;
    }
    let Some(source) = state.source.as_deref() else {
        end_run(state, EndReason::MusicEnded, frame);
        return;
    };
    let current = match source.note_index_at(frame as i64) {
        NoteCursor::At(index) => index,
        NoteCursor::Exhausted => {
            end_run(state, EndReason::MusicEnded, frame);
            return;
        }
    };

    // A hitch can skip several indices; every one of them is evaluated.
    let first_new = state.last_note.map_or(0, |last| last + 1);
    for note in first_new..=current {
        let fired = state.difficulty.on_note(note, frame, source);
        if fired.any() {
            debug!("Note {} on frame {} escalated: {:?}", note, frame, fired);
        }
        if state.difficulty.is_active(note) {
            let lanes = state.difficulty.lanes_for(note, source);
            for (lane, _) in lanes.iter().enumerate().filter(|(_, spawn)| **spawn) {
                if !state.lanes.spawn(lane, frame) {
                    debug!("Lane {} leading slot busy, note {} not spawned.", lane, note);
                }
            }
            state.lanes.spawn_tick(TickKind::HitTick, frame);
        }
        if note % TIME_SIG == 0 {
            state.lanes.spawn_tick(TickKind::BeatTick, frame);
        }
        state.last_note = Some(note);
    }

    let exits = state.lanes.advance(frame, state.difficulty.speed());

    for lane in 0..state.lanes.n_cols() {
        let verdict = judgment::judge_lane(
            &mut state.lanes,
            lane,
            input.lane(lane),
            exits.exited(lane),
            &mut state.feedback[lane],
        );
        for outcome in verdict.outcomes() {
            state.ledger.apply(outcome);
        }
    }

    if misses_exhausted(state) {
        end_run(state, EndReason::Misses, frame);
        return;
    }

    state.log_timer += 1;
    if state.log_timer >= state.settings.target_fps {
        info!(
            "Frame: {}, Note: {}, Score: {}, Combo: {}, Misses: {}, Active Arrows: {}, Speed: {}",
            frame,
            current,
            state.ledger.score(),
            state.ledger.combo_moves(),
            state.ledger.consecutive_misses(),
            state.lanes.live_objects(),
            state.difficulty.speed()
        );
        state.log_timer = 0;
    }
}

fn refresh_summary(state: &mut State, frame: u64, reason: Option<EndReason>) {
    state.summary = RunSummary::from_ledger(
        &state.ledger,
        frame,
        state.difficulty.notes_interval(),
        state.difficulty.speed().next(),
        state.settings.show_stats,
        reason,
    );
}

impl State {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn source(&self) -> Option<&dyn BeatSource> {
        self.source.as_deref()
    }

    /// Frame the run started on. Meaningless before `Phase::Running`.
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Speed record the playfield is scrolling with right now.
    pub fn speed(&self) -> &SpeedState {
        match self.phase {
            Phase::Waiting | Phase::WaitingRandomDelay { .. } => &self.ambient_speed,
            Phase::Running | Phase::Ended { .. } => self.difficulty.speed(),
        }
    }

    pub fn lane_positions(&self, lane: usize) -> Vec<usize> {
        self.lanes.positions(lane)
    }

    pub fn tick_positions(&self, kind: TickKind) -> Vec<usize> {
        self.lanes.tick_positions(kind)
    }

    pub fn feedback(&self, lane: usize) -> LaneFeedback {
        self.feedback.get(lane).copied().unwrap_or_default()
    }

    pub fn held(&self, lane: usize) -> bool {
        self.feedback(lane).held
    }

    pub fn banner(&self, frame: u64) -> Option<Escalation> {
        match self.phase {
            Phase::Running | Phase::Ended { .. } => self.difficulty.banner(frame),
            _ => None,
        }
    }

    /// True once the game-over screen has stayed up for a second.
    pub fn should_exit(&self, frame: u64) -> bool {
        match self.phase {
            Phase::Ended { frame: ended, .. } => {
                frame >= ended + u64::from(self.settings.target_fps)
            }
            _ => false,
        }
    }
}
