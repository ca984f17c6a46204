use crate::config::MAX_COLS;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Lane {
    Left = 0,
    Up = 1,
    Down = 2,
    Right = 3,
    L1 = 4,
    L2 = 5,
}

impl Lane {
    pub const ALL: [Lane; MAX_COLS] = [
        Lane::Left,
        Lane::Up,
        Lane::Down,
        Lane::Right,
        Lane::L1,
        Lane::L2,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub fn from_index(index: usize) -> Option<Lane> {
        Self::ALL.get(index).copied()
    }
}

/// Which of the two physical controls bound to a lane produced an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    #[default]
    Primary,
    Alternate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Lane(Lane),
    Quit,
}

/// A press or release, stamped with the frame it should be seen on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEdge {
    pub frame: u64,
    pub button: Button,
    #[serde(default)]
    pub binding: Binding,
    pub pressed: bool,
}

impl InputEdge {
    pub fn press(frame: u64, button: Button) -> Self {
        Self {
            frame,
            button,
            binding: Binding::Primary,
            pressed: true,
        }
    }

    pub fn release(frame: u64, button: Button) -> Self {
        Self {
            frame,
            button,
            binding: Binding::Primary,
            pressed: false,
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub held: bool,
    pub pressed: bool,
}

/// Per-frame key state folded from the queued edges.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    primary_lane_state: [bool; MAX_COLS],
    alternate_lane_state: [bool; MAX_COLS],
    pressed_this_frame: [bool; MAX_COLS],
    quit_held: bool,
    quit_pressed: bool,
    pending_edges: VecDeque<InputEdge>,
}

pub fn init_state() -> InputState {
    InputState::default()
}

impl InputState {
    /// Edges must be queued in frame order.
    pub fn queue_edge(&mut self, edge: InputEdge) {
        debug_assert!(
            self.pending_edges
                .back()
                .is_none_or(|last| last.frame <= edge.frame),
            "input edges queued out of order"
        );
        self.pending_edges.push_back(edge);
    }

    /// Applies every edge due on or before `frame`. A lane counts as pressed
    /// when it goes from released to held on either binding.
    pub fn begin_frame(&mut self, frame: u64) {
        self.pressed_this_frame = [false; MAX_COLS];
        self.quit_pressed = false;

        while self
            .pending_edges
            .front()
            .is_some_and(|edge| edge.frame <= frame)
        {
            let Some(edge) = self.pending_edges.pop_front() else {
                break;
            };
            match edge.button {
                Button::Quit => {
                    if edge.pressed && !self.quit_held {
                        self.quit_pressed = true;
                    }
                    self.quit_held = edge.pressed;
                }
                Button::Lane(lane) => {
                    let idx = lane.index();
                    let was_down = self.primary_lane_state[idx] || self.alternate_lane_state[idx];
                    match edge.binding {
                        Binding::Primary => self.primary_lane_state[idx] = edge.pressed,
                        Binding::Alternate => self.alternate_lane_state[idx] = edge.pressed,
                    }
                    let is_down = self.primary_lane_state[idx] || self.alternate_lane_state[idx];
                    if edge.pressed && is_down && !was_down {
                        self.pressed_this_frame[idx] = true;
                    }
                }
            }
        }
    }

    #[inline(always)]
    pub fn lane(&self, lane: usize) -> KeyState {
        if lane >= MAX_COLS {
            return KeyState::default();
        }
        KeyState {
            held: self.primary_lane_state[lane] || self.alternate_lane_state[lane],
            pressed: self.pressed_this_frame[lane],
        }
    }

    #[inline(always)]
    pub fn quit(&self) -> KeyState {
        KeyState {
            held: self.quit_held,
            pressed: self.quit_pressed,
        }
    }

    pub fn any_pressed(&self) -> bool {
        self.quit_pressed || self.pressed_this_frame.iter().any(|&p| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_only_on_its_frame() {
        let mut input = init_state();
        input.queue_edge(InputEdge::press(3, Button::Lane(Lane::Down)));

        input.begin_frame(2);
        assert_eq!(input.lane(Lane::Down.index()), KeyState::default());

        input.begin_frame(3);
        assert_eq!(
            input.lane(Lane::Down.index()),
            KeyState { held: true, pressed: true }
        );

        input.begin_frame(4);
        assert_eq!(
            input.lane(Lane::Down.index()),
            KeyState { held: true, pressed: false }
        );
    }

    #[test]
    fn alternate_binding_does_not_repress_a_held_lane() {
        let mut input = init_state();
        input.queue_edge(InputEdge::press(1, Button::Lane(Lane::Left)));
        input.queue_edge(
            InputEdge::press(2, Button::Lane(Lane::Left)).with_binding(Binding::Alternate),
        );
        input.queue_edge(InputEdge::release(3, Button::Lane(Lane::Left)));

        input.begin_frame(1);
        assert!(input.lane(0).pressed);
        input.begin_frame(2);
        assert!(!input.lane(0).pressed);
        input.begin_frame(3);
        // Alternate still holds the lane down.
        assert!(input.lane(0).held);
    }

    #[test]
    fn quit_and_any_pressed() {
        let mut input = init_state();
        input.queue_edge(InputEdge::press(0, Button::Quit));
        input.begin_frame(0);
        assert!(input.quit().pressed);
        assert!(input.any_pressed());
        input.begin_frame(1);
        assert!(!input.any_pressed());
        assert!(input.quit().held);
    }
}
