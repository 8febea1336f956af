//! Submission state machine.
//!
//! Idle -> CallConstructed -> GasEstimated -> Submitted -> Confirmed, with
//! Failed reachable from every non-terminal state.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Errors raised by the submission tracker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionStateError {
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition {
		from: SubmissionState,
		to: SubmissionState,
	},
}

/// Where a submission is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionState {
	Idle,
	CallConstructed,
	GasEstimated,
	Submitted,
	/// The wallet returned a hash and the transaction was registered.
	Confirmed,
	Failed,
}

impl SubmissionState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, SubmissionState::Confirmed | SubmissionState::Failed)
	}

	/// Checks if a state transition is valid
	pub fn can_transition_to(&self, next: SubmissionState) -> bool {
		// Static transition table - each state maps to allowed next states
		static TRANSITIONS: Lazy<HashMap<SubmissionState, HashSet<SubmissionState>>> =
			Lazy::new(|| {
				let mut m = HashMap::new();
				m.insert(
					SubmissionState::Idle,
					HashSet::from([SubmissionState::CallConstructed, SubmissionState::Failed]),
				);
				m.insert(
					SubmissionState::CallConstructed,
					HashSet::from([SubmissionState::GasEstimated, SubmissionState::Failed]),
				);
				m.insert(
					SubmissionState::GasEstimated,
					HashSet::from([SubmissionState::Submitted, SubmissionState::Failed]),
				);
				m.insert(
					SubmissionState::Submitted,
					HashSet::from([SubmissionState::Confirmed, SubmissionState::Failed]),
				);
				m.insert(SubmissionState::Confirmed, HashSet::new());
				m.insert(SubmissionState::Failed, HashSet::new());
				m
			});

		TRANSITIONS
			.get(self)
			.is_some_and(|allowed| allowed.contains(&next))
	}
}

impl fmt::Display for SubmissionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SubmissionState::Idle => "idle",
			SubmissionState::CallConstructed => "call_constructed",
			SubmissionState::GasEstimated => "gas_estimated",
			SubmissionState::Submitted => "submitted",
			SubmissionState::Confirmed => "confirmed",
			SubmissionState::Failed => "failed",
		};
		f.write_str(name)
	}
}

/// Tracks the state of one submission attempt.
#[derive(Debug)]
pub struct SubmissionTracker {
	state: SubmissionState,
}

impl Default for SubmissionTracker {
	fn default() -> Self {
		Self::new()
	}
}

impl SubmissionTracker {
	pub fn new() -> Self {
		Self {
			state: SubmissionState::Idle,
		}
	}

	pub fn state(&self) -> SubmissionState {
		self.state
	}

	/// Moves to `next`, rejecting transitions the table does not allow.
	pub fn advance(&mut self, next: SubmissionState) -> Result<(), SubmissionStateError> {
		if !self.state.can_transition_to(next) {
			return Err(SubmissionStateError::InvalidTransition {
				from: self.state,
				to: next,
			});
		}
		tracing::debug!(from = %self.state, to = %next, "Submission state changed");
		self.state = next;
		Ok(())
	}

	/// Marks the submission as failed unless it already finished.
	pub fn fail(&mut self) {
		if !self.state.is_terminal() {
			tracing::debug!(from = %self.state, "Submission failed");
			self.state = SubmissionState::Failed;
		}
	}
}
