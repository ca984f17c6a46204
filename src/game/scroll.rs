use crate::config::END_OF_TRACK;
use std::fmt;

/// Two-segment speed record, in slots per frame.
///
/// Objects spawned before `change_frame` move at `current`, objects spawned on
/// or after it move at `next`. Positions are always recomputed from the spawn
/// frame, so an escalation never has to touch the objects already in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedState {
    current: f64,
    next: f64,
    change_frame: u64,
}

impl SpeedState {
    pub fn new(initial: f64) -> Self {
        Self {
            current: initial,
            next: initial,
            change_frame: 0,
        }
    }

    #[inline(always)]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline(always)]
    pub fn next(&self) -> f64 {
        self.next
    }

    #[inline(always)]
    pub fn speed_at(&self, spawn_frame: u64) -> f64 {
        if spawn_frame >= self.change_frame {
            self.next
        } else {
            self.current
        }
    }

    pub fn escalate(&mut self, frame: u64, modifier: f64) {
        self.current = self.next;
        self.next *= modifier;
        self.change_frame = frame;
    }

    /// Slot an object spawned on `spawn_frame` occupies on `now`. Negative once
    /// it has left the playfield.
    #[inline(always)]
    pub fn slot_at(&self, spawn_frame: u64, now: u64) -> i64 {
        let elapsed = now.saturating_sub(spawn_frame) as f64;
        (END_OF_TRACK as f64 - elapsed * self.speed_at(spawn_frame)).round() as i64
    }

    /// Frames the slowest object in flight needs to cover `distance` slots.
    pub fn frames_to_travel(&self, distance: usize) -> u64 {
        let slowest = self.current.min(self.next);
        if !slowest.is_finite() || slowest <= 0.0 {
            return 0;
        }
        (distance as f64 / slowest).ceil() as u64
    }
}

impl fmt::Display for SpeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.current - self.next).abs() < f64::EPSILON {
            write!(f, "{:.2} px/f", self.next)
        } else {
            write!(f, "{:.2} -> {:.2} px/f @{}", self.current, self.next, self.change_frame)
        }
    }
}
