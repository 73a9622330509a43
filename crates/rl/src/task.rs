//! Pick-and-place task state machine
//!
//! ```text
//!   Idle ──pick @ target contact──▶ Holding ──place @ destination contact──▶ Placed
//!    ▲                                                                        │
//!    └──────────────── reset (or next cycle, when enabled) ───────────────────┘
//! ```
//!
//! The machine only moves forward. Rejected attempts leave the state alone;
//! scoring them is the reward shaper's job.

use physics::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Idle,
    Holding,
    Placed,
}

impl TaskState {
    /// The `(picked, placed)` flag pair.
    #[must_use]
    pub const fn flags(self) -> (bool, bool) {
        match self {
            TaskState::Idle => (false, false),
            TaskState::Holding => (true, false),
            TaskState::Placed => (true, true),
        }
    }
}

/// Outcome of a transition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Accepted,
    /// The attempt was made in a state that does not allow it.
    Invalid,
    /// Right state, but the end-effector was not in contact.
    NoContact,
}

#[derive(Clone, Debug)]
pub struct TaskStateMachine {
    state: TaskState,
    held: Option<Vec2>,
}

impl Default for TaskStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStateMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self { state: TaskState::Idle, held: None }
    }

    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Where the held payload was picked from, while holding.
    #[must_use]
    pub const fn held(&self) -> Option<Vec2> {
        self.held
    }

    /// Try `Idle → Holding`, grabbing the payload at `payload`.
    pub fn try_pick(&mut self, target_contact: bool, payload: Vec2) -> Transition {
        if self.state != TaskState::Idle {
            return Transition::Invalid;
        }
        if !target_contact {
            return Transition::NoContact;
        }
        self.state = TaskState::Holding;
        self.held = Some(payload);
        Transition::Accepted
    }

    /// Try `Holding → Placed`, releasing the payload.
    pub fn try_place(&mut self, destination_contact: bool) -> Transition {
        if self.state != TaskState::Holding {
            return Transition::Invalid;
        }
        if !destination_contact {
            return Transition::NoContact;
        }
        self.state = TaskState::Placed;
        self.held = None;
        Transition::Accepted
    }

    /// Re-arm after a successful place when episodes run several cycles.
    /// Has no effect in any other state.
    pub fn begin_next_cycle(&mut self) {
        if self.state == TaskState::Placed {
            self.state = TaskState::Idle;
        }
    }

    /// Force `Idle` and drop any payload.
    pub fn reset(&mut self) {
        self.state = TaskState::Idle;
        self.held = None;
    }
}
