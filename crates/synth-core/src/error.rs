//! Errors surfaced to the trader.
//!
//! Each variant's Display text is the message shown to the user, so the
//! wording is part of the interface.

use std::fmt;
use synth_types::Address;
use thiserror::Error;

/// Call data could not be assembled.
///
/// Keeps the contract the call was meant for so failures can be logged with
/// their context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallBuildFailure {
	pub target: Address,
	pub reason: String,
}

impl fmt::Display for CallBuildFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.reason)
	}
}

/// Outcome of a failed trade attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
	/// Account, chain, synchronizer or currencies missing; raised before any
	/// network call.
	#[error("Missing dependencies: {0}")]
	MissingDependency(String),
	#[error("Unable to fetch Muon signatures: {0}")]
	OracleSignature(String),
	#[error("Unexpected error, could not construct calldata: {0}")]
	CallBuild(CallBuildFailure),
	/// Gas estimation failed. Holds the classified revert reason, or the raw
	/// estimation message when the dry run did not revert.
	#[error("{0}")]
	GasEstimation(String),
	#[error("Transaction rejected.")]
	UserRejected,
	#[error("Transaction failed: {0}")]
	Submission(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_user_facing_messages() {
		assert_eq!(
			TradeError::MissingDependency("account".into()).to_string(),
			"Missing dependencies: account"
		);
		assert_eq!(
			TradeError::OracleSignature("stale".into()).to_string(),
			"Unable to fetch Muon signatures: stale"
		);
		assert_eq!(
			TradeError::CallBuild(CallBuildFailure {
				target: Address::ZERO,
				reason: "partner id not set".into(),
			})
			.to_string(),
			"Unexpected error, could not construct calldata: partner id not set"
		);
		assert_eq!(TradeError::UserRejected.to_string(), "Transaction rejected.");
		assert_eq!(
			TradeError::Submission("Unknown error".into()).to_string(),
			"Transaction failed: Unknown error"
		);
	}
}
