use crate::config::{BREATHING_FRAMES, END_OF_TRACK, HIT_LINE, MAX_COLS};
use crate::game::scroll::SpeedState;
use crate::game::settings::Settings;
use crate::game::timing::BeatSource;
use log::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Escalation {
    Speed,
    Notes,
    Track,
}

impl Escalation {
    pub const fn banner(self) -> &'static str {
        match self {
            Escalation::Speed => "MORE SPEED!",
            Escalation::Notes => "MORE MOVES!",
            Escalation::Track => "NEW TRACK!",
        }
    }
}

/// Which escalations fired on one note-index advance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Escalations {
    pub speed: bool,
    pub notes: bool,
    pub track: bool,
}

impl Escalations {
    pub fn any(&self) -> bool {
        self.speed || self.notes || self.track
    }
}

/// Escalates speed, note density and focus track as notes go by.
///
/// Counters count note indices. An interval is measured in grid cells of
/// `grid_width` indices and fires once `counter / grid_width` reaches it;
/// an interval of 0 never fires.
#[derive(Debug, Clone)]
pub struct Difficulty {
    grid_width: u64,
    n_cols: usize,
    speed_modifier: f64,
    speed_increase_interval: u32,
    notes_increase_interval: u32,
    track_next: Vec<usize>,
    track_change_interval: Vec<u32>,

    speed: SpeedState,
    notes_interval: u32,
    focus_track: usize,
    speed_counter: u64,
    notes_counter: u64,
    track_counter: u64,
    safe_frame: u64,
    last_escalation: Option<(Escalation, u64)>,
    lane_of_row: Vec<Option<usize>>,
}

impl Difficulty {
    pub fn new(settings: &Settings, grid_width: u64, source: Option<&dyn BeatSource>) -> Self {
        let focus_track = match source {
            Some(src) if settings.focus_track >= src.track_count() && src.track_count() > 0 => {
                warn!(
                    "Focus track {} not in source ({} tracks), using 0.",
                    settings.focus_track,
                    src.track_count()
                );
                0
            }
            _ => settings.focus_track,
        };
        let mut difficulty = Self {
            grid_width: grid_width.max(1),
            n_cols: settings.n_cols.clamp(1, MAX_COLS),
            speed_modifier: settings.speed_multiplier,
            speed_increase_interval: settings.speed_increase_interval,
            notes_increase_interval: settings.notes_increase_interval,
            track_next: settings.track_next.clone(),
            track_change_interval: settings.track_change_interval.clone(),
            speed: SpeedState::new(settings.initial_speed),
            notes_interval: settings.notes_interval.max(1),
            focus_track,
            speed_counter: 0,
            notes_counter: 0,
            track_counter: 0,
            safe_frame: 0,
            last_escalation: None,
            lane_of_row: Vec::new(),
        };
        if let Some(src) = source {
            difficulty.relayout(src);
        }
        difficulty
    }

    #[inline(always)]
    fn reached(counter: u64, interval: u32, grid_width: u64) -> bool {
        interval > 0 && counter / grid_width >= u64::from(interval)
    }

    /// Counts one evaluated note index and fires whatever escalations came due.
    pub fn on_note(&mut self, note_index: u64, frame: u64, source: &dyn BeatSource) -> Escalations {
        let mut fired = Escalations::default();
        self.speed_counter += 1;
        self.notes_counter += 1;
        self.track_counter += 1;

        if Self::reached(self.speed_counter, self.speed_increase_interval, self.grid_width) {
            if frame >= self.safe_frame {
                self.speed.escalate(frame, self.speed_modifier);
                self.safe_frame = frame + self.frames_until_clear();
                self.speed_counter = 0;
                self.last_escalation = Some((Escalation::Speed, frame));
                fired.speed = true;
                info!(
                    "Speed up at note {} (frame {}): {}, next change allowed at frame {}",
                    note_index, frame, self.speed, self.safe_frame
                );
            } else {
                debug!(
                    "Speed up deferred at note {}: frame {} < safe frame {}",
                    note_index, frame, self.safe_frame
                );
            }
        }

        if Self::reached(self.notes_counter, self.notes_increase_interval, self.grid_width) {
            self.notes_counter = 0;
            if self.notes_interval > 1 {
                self.notes_interval -= 1;
                self.relayout(source);
                self.last_escalation = Some((Escalation::Notes, frame));
                fired.notes = true;
                info!(
                    "More notes at note {} (frame {}): interval now 1 in {}",
                    note_index, frame, self.notes_interval
                );
            }
        }

        let track_interval = self
            .track_change_interval
            .get(self.focus_track)
            .copied()
            .unwrap_or(0);
        if Self::reached(self.track_counter, track_interval, self.grid_width) {
            self.track_counter = 0;
            let successor = self.track_next.get(self.focus_track).copied();
            match successor {
                Some(next) if next != self.focus_track && next < source.track_count() => {
                    info!(
                        "Track change at note {} (frame {}): {} -> {}",
                        note_index, frame, self.focus_track, next
                    );
                    self.focus_track = next;
                    self.relayout(source);
                    self.last_escalation = Some((Escalation::Track, frame));
                    fired.track = true;
                }
                _ => debug!("Track {} has no successor to change to.", self.focus_track),
            }
        }

        fired
    }

    /// Frames an object spawned now needs to reach the hit line at the slowest
    /// speed still in flight.
    pub fn frames_until_mark(&self) -> u64 {
        self.speed.frames_to_travel(END_OF_TRACK - HIT_LINE)
    }

    /// Frames until every object spawned before now has left the playfield.
    /// The next speed-up waits this long so no object in flight ever changes
    /// speed.
    pub fn frames_until_clear(&self) -> u64 {
        self.speed.frames_to_travel(END_OF_TRACK + 1)
    }

    /// Maps the focus track's eligible rows onto lanes round-robin. A row is
    /// eligible when it holds a note on some index the notes interval keeps.
    pub fn relayout(&mut self, source: &dyn BeatSource) {
        let rows = source.row_count(self.focus_track);
        let interval = u64::from(self.notes_interval);
        let span = source.length() * interval;
        let mut next_lane = 0;
        self.lane_of_row = (0..rows)
            .map(|row| {
                let eligible = (0..span)
                    .step_by(interval as usize)
                    .any(|n| source.row_has_note(self.focus_track, n, row));
                eligible.then(|| {
                    let lane = next_lane % self.n_cols;
                    next_lane += 1;
                    lane
                })
            })
            .collect();
        debug!(
            "Lane layout for track {} at 1 in {}: {:?}",
            self.focus_track, self.notes_interval, self.lane_of_row
        );
    }

    #[inline(always)]
    pub fn is_active(&self, note_index: u64) -> bool {
        note_index % u64::from(self.notes_interval) == 0
    }

    /// Lanes that receive an object for `note_index`.
    pub fn lanes_for(&self, note_index: u64, source: &dyn BeatSource) -> [bool; MAX_COLS] {
        let mut lanes = [false; MAX_COLS];
        for (row, lane) in self.lane_of_row.iter().enumerate() {
            if let Some(lane) = *lane {
                if source.row_has_note(self.focus_track, note_index, row) {
                    lanes[lane] = true;
                }
            }
        }
        lanes
    }

    pub fn speed(&self) -> &SpeedState {
        &self.speed
    }
    pub fn notes_interval(&self) -> u32 {
        self.notes_interval
    }
    pub fn focus_track(&self) -> usize {
        self.focus_track
    }
    pub fn lane_of_row(&self) -> &[Option<usize>] {
        &self.lane_of_row
    }
    pub fn safe_frame(&self) -> u64 {
        self.safe_frame
    }

    /// Escalation whose banner is still up on `frame`.
    pub fn banner(&self, frame: u64) -> Option<Escalation> {
        self.last_escalation
            .filter(|(_, at)| frame < at + BREATHING_FRAMES)
            .map(|(kind, _)| kind)
    }
}
