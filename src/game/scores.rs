use crate::config::BASE_SCORE;
use crate::game::judgment::Judgment;
use log::{debug, error, info};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Quit,
    Misses,
    MusicEnded,
}

impl EndReason {
    /// Stable numeric code for the outcard.
    pub const fn code(self) -> u8 {
        match self {
            EndReason::Quit => 1,
            EndReason::Misses => 2,
            EndReason::MusicEnded => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMultipliers {
    pub perfect: f64,
    pub nice: f64,
    pub good: f64,
}

impl Default for ScoreMultipliers {
    fn default() -> Self {
        Self {
            perfect: 4.0,
            nice: 1.5,
            good: 1.0,
        }
    }
}

impl ScoreMultipliers {
    fn for_judgment(&self, judgment: Judgment) -> f64 {
        match judgment {
            Judgment::Perfect => self.perfect,
            Judgment::Nice => self.nice,
            Judgment::Good => self.good,
            Judgment::Bad | Judgment::Miss => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JudgmentCounts {
    pub perfect: u32,
    pub nice: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
}

impl JudgmentCounts {
    fn bump(&mut self, judgment: Judgment) {
        let slot = match judgment {
            Judgment::Perfect => &mut self.perfect,
            Judgment::Nice => &mut self.nice,
            Judgment::Good => &mut self.good,
            Judgment::Bad => &mut self.bad,
            Judgment::Miss => &mut self.miss,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.nice + self.good + self.bad + self.miss
    }
}

/// Points for a scoring press once `combo_moves` already includes it:
/// `ceil(100 * (1 + combo * 0.1) * multiplier)`. Evaluated on a tenfold
/// integer base so that values like 1.1 never pick up a binary fraction.
pub fn points_for(combo_moves: u32, multiplier: f64) -> u64 {
    let tenths = (10 + u64::from(combo_moves)) * (BASE_SCORE / 10);
    (tenths as f64 * multiplier).ceil().max(0.0) as u64
}

/// Combo and score bookkeeping for one run. Mutated only through `apply`.
#[derive(Debug, Clone)]
pub struct Ledger {
    multipliers: ScoreMultipliers,
    combo_moves: u32,
    consecutive_misses: u32,
    score: u64,
    counts: JudgmentCounts,
    max_combo: u32,
    max_combo_score: u64,
    frozen: bool,
}

impl Ledger {
    pub fn new(multipliers: ScoreMultipliers) -> Self {
        Self {
            multipliers,
            combo_moves: 0,
            consecutive_misses: 0,
            score: 0,
            counts: JudgmentCounts::default(),
            max_combo: 0,
            max_combo_score: 0,
            frozen: false,
        }
    }

    /// Records one classified outcome and returns the points it earned.
    pub fn apply(&mut self, judgment: Judgment) -> u64 {
        if self.frozen {
            debug!("Ledger frozen, ignoring {:?}", judgment);
            return 0;
        }
        self.counts.bump(judgment);

        if judgment.is_penalty() {
            // BAD and MISS share the penalty branch: break the combo, count a miss.
            self.combo_moves = 0;
            self.consecutive_misses = self.consecutive_misses.saturating_add(1);
            return 0;
        }

        self.combo_moves = self.combo_moves.saturating_add(1);
        self.consecutive_misses = 0;
        let points = points_for(self.combo_moves, self.multipliers.for_judgment(judgment));
        self.score = self.score.saturating_add(points);
        self.max_combo = self.max_combo.max(self.combo_moves);
        self.max_combo_score = self.max_combo_score.max(points);
        points
    }

    pub fn finalize(&mut self) {
        if !self.frozen {
            info!(
                "Final score {} (max combo {}, best press {}), {:?}",
                self.score, self.max_combo, self.max_combo_score, self.counts
            );
        }
        self.frozen = true;
    }

    pub fn combo_moves(&self) -> u32 {
        self.combo_moves
    }
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }
    pub fn score(&self) -> u64 {
        self.score
    }
    pub fn counts(&self) -> JudgmentCounts {
        self.counts
    }
    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }
    pub fn max_combo_score(&self) -> u64 {
        self.max_combo_score
    }
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// End-of-frame report handed to the rendering/reporting side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub frame: u64,
    pub score: u64,
    pub notes_interval: u32,
    pub speed: f64,
    pub max_combo: u32,
    pub max_combo_score: u64,
    pub n_perfect: u32,
    pub n_nice: u32,
    pub n_good: u32,
    pub n_miss: u32,
    pub n_bad: u32,
    pub show_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_code: Option<u8>,
}

impl RunSummary {
    pub fn from_ledger(
        ledger: &Ledger,
        frame: u64,
        notes_interval: u32,
        speed: f64,
        show_stats: bool,
        end_reason: Option<EndReason>,
    ) -> Self {
        let counts = ledger.counts();
        Self {
            frame,
            score: ledger.score(),
            notes_interval,
            speed,
            max_combo: ledger.max_combo(),
            max_combo_score: ledger.max_combo_score(),
            n_perfect: counts.perfect,
            n_nice: counts.nice,
            n_good: counts.good,
            n_miss: counts.miss,
            n_bad: counts.bad,
            show_stats,
            end_reason,
            end_code: end_reason.map(EndReason::code),
        }
    }

    /// Single-line `JSON{...}` report.
    pub fn to_outcard(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("JSON{}", json),
            Err(e) => {
                error!("Failed to serialize run summary: {}", e);
                "JSON{}".to_string()
            }
        }
    }
}
