use crate::config::TIME_SIG;
use crate::game::parsing::pattern::Pattern;
use log::{debug, info};

/// Where the scheduling clock sits inside the beat source's timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteCursor {
    At(u64),
    Exhausted,
}

/// The discrete note timeline the run schedules against.
///
/// `note_index_at` must never decrease for increasing frames and must never
/// surface a negative index: frames before the start map to index 0.
pub trait BeatSource {
    fn note_index_at(&self, playback_frame: i64) -> NoteCursor;
    fn row_has_note(&self, track: usize, note_index: u64, row: usize) -> bool;
    fn track_count(&self) -> usize;
    fn row_count(&self, track: usize) -> usize;
    /// Number of note indices in one loop of the source.
    fn length(&self) -> u64;
    /// Frames the audio clock lags the scheduling clock by.
    fn set_start_offset(&mut self, frames: i64);
    /// Puts note index 0 on `frame` of the scheduling clock.
    fn seek(&mut self, frame: i64);
    /// Frame on which the audio collaborator should start playback.
    fn audio_start_frame(&self) -> i64;
}

/// A looping step pattern held in memory.
#[derive(Debug, Clone)]
pub struct PatternSource {
    pattern: Pattern,
    loops: u32,
    target_fps: u32,
    start_frame: i64,
    start_offset: i64,
}

impl PatternSource {
    /// `loops == 0` plays forever.
    pub fn new(pattern: Pattern, loops: u32, target_fps: u32) -> Self {
        info!(
            "Beat source '{}': {:.2} BPM, {} notes per loop, {} track(s), loops: {}",
            pattern.name,
            pattern.bpm,
            pattern.length,
            pattern.tracks.len(),
            if loops == 0 { "forever".to_string() } else { loops.to_string() }
        );
        Self {
            pattern,
            loops,
            target_fps: target_fps.max(1),
            start_frame: 0,
            start_offset: 0,
        }
    }

    #[inline(always)]
    fn notes_per_frame(&self) -> f64 {
        self.pattern.bpm * TIME_SIG as f64 / (60.0 * self.target_fps as f64)
    }

    #[inline(always)]
    fn index_for(&self, playback_frame: i64) -> u64 {
        let elapsed = playback_frame - self.start_frame;
        if elapsed <= 0 {
            return 0;
        }
        (elapsed as f64 * self.notes_per_frame()).floor() as u64
    }
}

impl BeatSource for PatternSource {
    fn note_index_at(&self, playback_frame: i64) -> NoteCursor {
        let index = self.index_for(playback_frame);
        if self.loops > 0 && index / self.pattern.length >= u64::from(self.loops) {
            return NoteCursor::Exhausted;
        }
        NoteCursor::At(index)
    }

    fn row_has_note(&self, track: usize, note_index: u64, row: usize) -> bool {
        let step = (note_index % self.pattern.length) as usize;
        self.pattern
            .tracks
            .get(track)
            .and_then(|t| t.rows.get(row))
            .and_then(|steps| steps.get(step))
            .copied()
            .unwrap_or(false)
    }

    fn track_count(&self) -> usize {
        self.pattern.tracks.len()
    }

    fn row_count(&self, track: usize) -> usize {
        self.pattern.tracks.get(track).map_or(0, |t| t.rows.len())
    }

    fn length(&self) -> u64 {
        self.pattern.length
    }

    fn set_start_offset(&mut self, frames: i64) {
        self.start_offset = frames;
    }

    fn seek(&mut self, frame: i64) {
        debug!("Beat source seek: note 0 at frame {}", frame);
        self.start_frame = frame;
    }

    fn audio_start_frame(&self) -> i64 {
        self.start_frame + self.start_offset
    }
}
