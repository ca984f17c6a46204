use crate::config::{END_OF_TRACK, MAX_COLS, SCREEN_SIZE};
use crate::game::scroll::SpeedState;
use log::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickKind {
    HitTick,
    BeatTick,
}

impl TickKind {
    #[inline(always)]
    const fn index(self) -> usize {
        match self {
            TickKind::HitTick => 0,
            TickKind::BeatTick => 1,
        }
    }
}

/// Per-lane flags raised by `LaneTable::advance` for objects that left the playfield.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LaneExits(pub [bool; MAX_COLS]);

impl LaneExits {
    #[inline(always)]
    pub fn exited(&self, lane: usize) -> bool {
        self.0.get(lane).copied().unwrap_or(false)
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|&e| e)
    }
}

/// One column of screen slots. The slot an object sits in is its identity; the
/// stored value is the frame it spawned on.
#[derive(Clone, Debug)]
struct SlotTrack {
    slots: [Option<u64>; SCREEN_SIZE],
}

impl Default for SlotTrack {
    fn default() -> Self {
        Self {
            slots: [None; SCREEN_SIZE],
        }
    }
}

impl SlotTrack {
    fn spawn(&mut self, frame: u64) -> bool {
        let leading = &mut self.slots[END_OF_TRACK];
        if leading.is_some() {
            return false;
        }
        *leading = Some(frame);
        true
    }

    /// Moves every object to the slot its spawn frame puts it on. Reads only
    /// from the pre-advance snapshot so a relocated object is never moved twice.
    fn advance(&mut self, now: u64, speed: &SpeedState) -> bool {
        let snapshot = self.slots;
        self.slots = [None; SCREEN_SIZE];
        let mut exited = false;
        let mut floor = 0;

        // Nearest first, so a placed object is never passed by one behind it.
        for spawn_frame in snapshot.iter().flatten().copied() {
            let target = speed.slot_at(spawn_frame, now);
            if target < 0 {
                exited = true;
                continue;
            }
            // A faster object that caught a slower one queues up right behind it.
            let slot = (target as usize).min(END_OF_TRACK).max(floor);
            if slot > END_OF_TRACK {
                warn!("Lane overflow, dropping object spawned on frame {}", spawn_frame);
                debug_assert!(false, "lane overflow");
                continue;
            }
            self.slots[slot] = Some(spawn_frame);
            floor = slot + 1;
        }
        exited
    }

    fn first_occupied(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_some)
    }

    fn take(&mut self, slot: usize) -> Option<u64> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.map(|_| slot))
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn clear(&mut self) {
        self.slots = [None; SCREEN_SIZE];
    }
}

/// All in-flight objects: one slot track per lane plus the two tick tracks.
#[derive(Clone, Debug)]
pub struct LaneTable {
    n_cols: usize,
    lanes: [SlotTrack; MAX_COLS],
    ticks: [SlotTrack; 2],
}

impl LaneTable {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols: n_cols.clamp(1, MAX_COLS),
            lanes: Default::default(),
            ticks: Default::default(),
        }
    }

    #[inline(always)]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Writes `frame` into the lane's leading slot. No-op when that slot is
    /// already taken or the lane is not in play.
    pub fn spawn(&mut self, lane: usize, frame: u64) -> bool {
        if lane >= self.n_cols {
            return false;
        }
        self.lanes[lane].spawn(frame)
    }

    pub fn spawn_tick(&mut self, kind: TickKind, frame: u64) -> bool {
        self.ticks[kind.index()].spawn(frame)
    }

    pub fn advance(&mut self, now: u64, speed: &SpeedState) -> LaneExits {
        let mut exits = LaneExits::default();
        for (lane, track) in self.lanes.iter_mut().take(self.n_cols).enumerate() {
            exits.0[lane] = track.advance(now, speed);
        }
        for track in &mut self.ticks {
            track.advance(now, speed);
        }
        exits
    }

    pub fn first_occupied(&self, lane: usize) -> Option<usize> {
        self.lanes.get(lane).and_then(SlotTrack::first_occupied)
    }

    /// Removes and returns the spawn frame held in `slot`.
    pub fn take(&mut self, lane: usize, slot: usize) -> Option<u64> {
        self.lanes.get_mut(lane).and_then(|t| t.take(slot))
    }

    pub fn positions(&self, lane: usize) -> Vec<usize> {
        self.lanes
            .get(lane)
            .map(|t| t.positions().collect())
            .unwrap_or_default()
    }

    pub fn tick_positions(&self, kind: TickKind) -> Vec<usize> {
        self.ticks[kind.index()].positions().collect()
    }

    pub fn spawn_frame_at(&self, lane: usize, slot: usize) -> Option<u64> {
        self.lanes.get(lane).and_then(|t| t.slots.get(slot).copied().flatten())
    }

    pub fn live_objects(&self) -> usize {
        self.lanes.iter().take(self.n_cols).map(SlotTrack::len).sum()
    }

    pub fn clear(&mut self) {
        for track in self.lanes.iter_mut().chain(self.ticks.iter_mut()) {
            track.clear();
        }
    }
}
