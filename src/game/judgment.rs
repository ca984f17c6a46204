use crate::config::{GOOD_DISTANCE, HIT_LINE, NICE_DISTANCE, N_ANIMATION_FRAMES, PERFECT_DISTANCE};
use crate::core::input::KeyState;
use crate::game::lanes::LaneTable;
use log::info;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    Perfect,
    Nice,
    Good,
    Bad,
    Miss,
}

impl Judgment {
    /// BAD and MISS break the combo and never score.
    #[inline(always)]
    pub const fn is_penalty(self) -> bool {
        matches!(self, Judgment::Bad | Judgment::Miss)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Judgment::Perfect => "PERFECT!",
            Judgment::Nice => "Nice!",
            Judgment::Good => "Good",
            Judgment::Bad => "Bad",
            Judgment::Miss => "Miss",
        }
    }
}

/// Grades a press by its distance from the hit line. Each threshold is an
/// exclusive upper bound, so a tie falls to the worse grade.
pub fn classify(distance: usize) -> Judgment {
    if distance < PERFECT_DISTANCE {
        Judgment::Perfect
    } else if distance < NICE_DISTANCE {
        Judgment::Nice
    } else if distance < GOOD_DISTANCE {
        Judgment::Good
    } else {
        Judgment::Bad
    }
}

/// What the renderer shows above a lane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LaneFeedback {
    pub last: Option<Judgment>,
    pub frames_left: u32,
    pub held: bool,
}

impl LaneFeedback {
    fn tick(&mut self) {
        if self.frames_left > 0 {
            self.frames_left -= 1;
        } else {
            self.last = None;
        }
    }

    fn show(&mut self, judgment: Judgment) {
        self.last = Some(judgment);
        self.frames_left = N_ANIMATION_FRAMES;
    }
}

/// Outcomes one lane produced this frame. A press and an exit are independent,
/// so a single frame can carry both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LaneVerdict {
    pub press: Option<Judgment>,
    pub exit: Option<Judgment>,
}

impl LaneVerdict {
    pub fn outcomes(&self) -> impl Iterator<Item = Judgment> {
        self.press.into_iter().chain(self.exit)
    }
}

pub fn judge_lane(
    table: &mut LaneTable,
    lane: usize,
    key: KeyState,
    exited: bool,
    feedback: &mut LaneFeedback,
) -> LaneVerdict {
    feedback.tick();
    feedback.held = key.held;

    let mut verdict = LaneVerdict::default();

    if key.pressed {
        if let Some(slot) = table.first_occupied(lane) {
            let distance = slot.abs_diff(HIT_LINE);
            let judgment = classify(distance);
            if !judgment.is_penalty() {
                table.take(lane, slot);
            }
            info!(
                "JUDGED: Lane {}, Slot {}, Distance {}, Grade: {}",
                lane, slot, distance, judgment.label()
            );
            verdict.press = Some(judgment);
        }
    }

    if exited {
        info!("MISSED: Lane {}", lane);
        verdict.exit = Some(Judgment::Miss);
    } else if key.pressed && verdict.press.is_none() {
        info!("EMPTY PRESS: Lane {}", lane);
        verdict.press = Some(Judgment::Bad);
    }

    if let Some(judgment) = verdict.press {
        feedback.show(judgment);
    }
    if let Some(judgment) = verdict.exit {
        feedback.show(judgment);
    }
    verdict
}
