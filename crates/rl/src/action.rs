//! Discrete action space.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};

/// How pick and place are triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Reaching contact is the trigger; the action space has four moves.
    Implicit,
    /// The agent must send `Pick` / `Place`; the action space has six codes.
    Explicit,
}

/// One agent action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    DecreaseAngle1,
    IncreaseAngle1,
    IncreaseAngle2,
    DecreaseAngle2,
    Pick,
    Place,
}

impl Action {
    pub const MOVES: [Action; 4] = [
        Action::DecreaseAngle1,
        Action::IncreaseAngle1,
        Action::IncreaseAngle2,
        Action::DecreaseAngle2,
    ];

    pub const ALL: [Action; 6] = [
        Action::DecreaseAngle1,
        Action::IncreaseAngle1,
        Action::IncreaseAngle2,
        Action::DecreaseAngle2,
        Action::Pick,
        Action::Place,
    ];

    /// Integer code of this action.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Action::DecreaseAngle1 => 0,
            Action::IncreaseAngle1 => 1,
            Action::IncreaseAngle2 => 2,
            Action::DecreaseAngle2 => 3,
            Action::Pick => 4,
            Action::Place => 5,
        }
    }

    /// Decode `code` for an environment using `mode`.
    ///
    /// # Errors
    ///
    /// [`EnvError::InvalidAction`] when the code is outside the action space,
    /// which includes `Pick`/`Place` under [`TriggerMode::Implicit`].
    pub fn from_code(code: u32, mode: TriggerMode) -> Result<Self, EnvError> {
        let action = *Self::ALL
            .get(code as usize)
            .ok_or(EnvError::InvalidAction(code))?;
        if action.is_available(mode) {
            Ok(action)
        } else {
            Err(EnvError::InvalidAction(code))
        }
    }

    /// Whether this action belongs to the action space of `mode`.
    #[must_use]
    pub const fn is_available(self, mode: TriggerMode) -> bool {
        match self {
            Action::Pick | Action::Place => matches!(mode, TriggerMode::Explicit),
            _ => true,
        }
    }

    /// Joint deltas in units of the configured step angle.
    #[must_use]
    pub const fn direction(self) -> (f64, f64) {
        match self {
            Action::DecreaseAngle1 => (-1.0, 0.0),
            Action::IncreaseAngle1 => (1.0, 0.0),
            Action::IncreaseAngle2 => (0.0, 1.0),
            Action::DecreaseAngle2 => (0.0, -1.0),
            Action::Pick | Action::Place => (0.0, 0.0),
        }
    }
}

impl TriggerMode {
    /// Number of discrete action codes.
    #[must_use]
    pub const fn action_count(self) -> usize {
        match self {
            TriggerMode::Implicit => 4,
            TriggerMode::Explicit => 6,
        }
    }
}
