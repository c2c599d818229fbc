//! Issuance state machine.
//!
//! # States
//!
//! - `Validating`: parsing the serial number
//! - `Evaluating`: reading the device and applying the readiness gate
//! - `Composing`: building the label page
//! - `Persisting`: recording the `preready` issuance
//! - `Printing`: sending the page to the printer (skipped in dry-run)
//! - `Done`, `Rejected`, `Failed`: terminal
//!
//! # Valid Transitions
//!
//! - Validating → Evaluating → Composing → Persisting → Printing → Done
//! - Persisting → Done (printing disabled)
//! - Validating / Evaluating → Rejected
//! - Composing / Persisting / Printing → Failed
//!
//! # Examples
//!
//! ```
//! use labelstation_station::{IssuanceState, IssuanceTrail};
//!
//! let mut trail = IssuanceTrail::new();
//! trail.transition_to(IssuanceState::Evaluating).unwrap();
//! assert!(trail.transition_to(IssuanceState::Printing).is_err());
//! assert_eq!(trail.current_state(), IssuanceState::Evaluating);
//! ```

use labelstation_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceState {
    Validating,
    Evaluating,
    Composing,
    Persisting,
    Printing,
    Done,
    Rejected,
    Failed,
}

impl fmt::Display for IssuanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssuanceState::Validating => "Validating",
            IssuanceState::Evaluating => "Evaluating",
            IssuanceState::Composing => "Composing",
            IssuanceState::Persisting => "Persisting",
            IssuanceState::Printing => "Printing",
            IssuanceState::Done => "Done",
            IssuanceState::Rejected => "Rejected",
            IssuanceState::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

impl IssuanceState {
    /// Check if transition to `target` is valid from this state.
    ///
    /// ```
    /// use labelstation_station::IssuanceState;
    ///
    /// assert!(IssuanceState::Persisting.can_transition_to(&IssuanceState::Printing));
    /// assert!(!IssuanceState::Composing.can_transition_to(&IssuanceState::Printing));
    /// ```
    pub fn can_transition_to(&self, target: &IssuanceState) -> bool {
        matches!(
            (self, target),
            // From Validating
            (IssuanceState::Validating, IssuanceState::Evaluating | IssuanceState::Rejected)
            // From Evaluating
            | (IssuanceState::Evaluating, IssuanceState::Composing | IssuanceState::Rejected)
            // From Composing: nothing is persisted on failure
            | (IssuanceState::Composing, IssuanceState::Persisting | IssuanceState::Failed)
            // From Persisting
            | (IssuanceState::Persisting, IssuanceState::Printing | IssuanceState::Done | IssuanceState::Failed)
            // From Printing
            | (IssuanceState::Printing, IssuanceState::Done | IssuanceState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IssuanceState::Done | IssuanceState::Rejected | IssuanceState::Failed
        )
    }
}

/// A single state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: IssuanceState,
    pub to: IssuanceState,

    /// Not serialized; set to the deserialization time when read back.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: IssuanceState, to: IssuanceState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// The path one issuance took through the state machine.
#[derive(Debug, Clone)]
pub struct IssuanceTrail {
    current_state: IssuanceState,
    started_at: Instant,
    history: Vec<StateTransition>,
}

impl IssuanceTrail {
    /// Start a trail in `Validating`.
    pub fn new() -> Self {
        Self {
            current_state: IssuanceState::Validating,
            started_at: Instant::now(),
            history: Vec::with_capacity(6),
        }
    }

    pub fn current_state(&self) -> IssuanceState {
        self.current_state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// States visited, starting with `Validating`.
    pub fn states(&self) -> Vec<IssuanceState> {
        std::iter::once(IssuanceState::Validating)
            .chain(self.history.iter().map(|t| t.to))
            .collect()
    }

    /// Time since the trail was started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Transition to `new_state`, validating the transition.
    ///
    /// # Errors
    ///
    /// `Error::InvalidStateTransition` if the move is not allowed from the
    /// current state; the trail is left unchanged.
    pub fn transition_to(&mut self, new_state: IssuanceState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        debug!(state = %new_state, from = %self.current_state, "Issuance state change");

        self.current_state = new_state;
        self.history.push(transition.clone());

        Ok(transition)
    }
}

impl Default for IssuanceTrail {
    fn default() -> Self {
        Self::new()
    }
}
