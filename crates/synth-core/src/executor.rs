//! Submission executor.
//!
//! Turns a built call into a broadcast transaction: estimate gas, fall back
//! to a dry run to explain a failed estimate, send with a safety margin and
//! register the result. Every provider failure is classified before it
//! reaches the trader.

use crate::classify::{is_user_rejected, ErrorClassifier};
use crate::state::{SubmissionState, SubmissionTracker};
use crate::TradeError;
use std::sync::Arc;
use synth_delivery::{DeliveryError, DeliveryService};
use synth_history::HistoryService;
use synth_types::{truncate_hash, Address, CallPayload, TransactionHash, TransactionRequest};

/// Default extra gas on top of the estimate, in basis points (20 %).
pub const DEFAULT_GAS_MARGIN_BPS: u64 = 2000;

const BPS_DENOMINATOR: u128 = 10_000;

/// Adds `margin_bps` basis points to a gas estimate, saturating at `u64::MAX`.
pub fn calculate_gas_margin(estimate: u64, margin_bps: u64) -> u64 {
	let padded = u128::from(estimate) * (BPS_DENOMINATOR + u128::from(margin_bps)) / BPS_DENOMINATOR;
	u64::try_from(padded).unwrap_or(u64::MAX)
}

/// Who sends a submission, where, and how it is described in history.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
	pub chain_id: u64,
	pub from: Address,
	pub summary: String,
}

pub struct SubmissionExecutor {
	delivery: Arc<DeliveryService>,
	history: Arc<HistoryService>,
	classifier: ErrorClassifier,
	gas_margin_bps: u64,
}

impl SubmissionExecutor {
	pub fn new(
		delivery: Arc<DeliveryService>,
		history: Arc<HistoryService>,
		classifier: ErrorClassifier,
		gas_margin_bps: u64,
	) -> Self {
		Self {
			delivery,
			history,
			classifier,
			gas_margin_bps,
		}
	}

	/// Submits `payload`. The tracker must be in `CallConstructed`.
	pub async fn submit(
		&self,
		payload: &CallPayload,
		context: &SubmissionContext,
		tracker: &mut SubmissionTracker,
	) -> Result<TransactionHash, TradeError> {
		let result = self.run(payload, context, tracker).await;
		if result.is_err() {
			tracker.fail();
		}
		result
	}

	async fn run(
		&self,
		payload: &CallPayload,
		context: &SubmissionContext,
		tracker: &mut SubmissionTracker,
	) -> Result<TransactionHash, TradeError> {
		let request = TransactionRequest::new(context.chain_id, context.from, payload);

		let estimate = match self.delivery.estimate_gas(&request).await {
			Ok(estimate) => estimate,
			Err(e) => return Err(self.explain_estimate_failure(&request, e).await),
		};
		advance(tracker, SubmissionState::GasEstimated)?;

		let gas_limit = calculate_gas_margin(estimate, self.gas_margin_bps);
		tracing::debug!(estimate, gas_limit, "Gas estimated");

		let hash = match self
			.delivery
			.send_transaction(&request.with_gas_limit(gas_limit))
			.await
		{
			Ok(hash) => hash,
			Err(e) => return Err(self.classify_send_failure(e)),
		};
		advance(tracker, SubmissionState::Submitted)?;
		tracing::info!(
			tx_hash = %truncate_hash(&hash.to_string()),
			chain_id = context.chain_id,
			"Submitted transaction"
		);

		if let Err(e) = self
			.history
			.add_transaction(&hash, context.chain_id, context.from, context.summary.clone())
			.await
		{
			tracing::warn!(
				tx_hash = %truncate_hash(&hash.to_string()),
				error = %e,
				"Failed to register transaction"
			);
		}
		advance(tracker, SubmissionState::Confirmed)?;

		Ok(hash)
	}

	/// Replays a request whose estimate failed to find out why.
	async fn explain_estimate_failure(
		&self,
		request: &TransactionRequest,
		estimate_error: DeliveryError,
	) -> TradeError {
		let estimate_error = estimate_error.into_provider_error();
		tracing::debug!(error = %estimate_error, "Gas estimation failed, replaying as call");

		match self.delivery.call(request).await {
			Ok(_) => {
				tracing::warn!(
					error = %estimate_error,
					"Gas estimation failed but the call succeeded"
				);
				TradeError::GasEstimation(estimate_error.message())
			}
			Err(call_error) => {
				let call_error = call_error.into_provider_error();
				let message = self.classifier.classify_provider_error(&call_error);
				tracing::error!(error = %call_error, reason = %message, "Call reverted");
				TradeError::GasEstimation(message)
			}
		}
	}

	fn classify_send_failure(&self, error: DeliveryError) -> TradeError {
		let error = error.into_provider_error();
		if is_user_rejected(error.payload()) {
			tracing::info!("Transaction rejected by user");
			return TradeError::UserRejected;
		}

		let message = self.classifier.classify_provider_error(&error);
		tracing::error!(error = %error, reason = %message, "Transaction failed");
		TradeError::Submission(message)
	}
}

fn advance(tracker: &mut SubmissionTracker, next: SubmissionState) -> Result<(), TradeError> {
	tracker
		.advance(next)
		.map_err(|e| TradeError::Submission(e.to_string()))
}
