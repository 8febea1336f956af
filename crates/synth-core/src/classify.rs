//! Provider error classification.
//!
//! Wallets and RPC nodes nest errors inside each other with no common schema.
//! The revert reason is found by walking the cause chain, then mapped to a
//! message the trader can act on.

use std::collections::HashMap;
use synth_types::ProviderError;

/// Upper bound on the number of nested causes visited.
pub const MAX_CAUSE_DEPTH: usize = 32;

const REVERT_PREFIX: &str = "execution reverted: ";

/// Known revert reasons and the message shown for each.
pub const KNOWN_REVERTS: &[(&str, &str)] = &[(
	"Synchronizer: INVALID_PARTNER_ID",
	"This transaction will not succeed due to an invalid partner ID. Try registering an address via PartnerManager.",
)];

/// One link of an error cause chain.
pub trait ErrorCause {
	/// Explicit revert reason; ends the walk when present.
	fn reason(&self) -> Option<&str>;
	/// Fallback description (`data.message`, then `message`).
	fn message(&self) -> Option<&str>;
	/// Numeric error code.
	fn code(&self) -> Option<i64>;
	/// Wrapped cause (`error`, then `data.originalError`).
	fn cause(&self) -> Option<&Self>;
}

impl ErrorCause for serde_json::Value {
	fn reason(&self) -> Option<&str> {
		self.get("reason").and_then(|r| r.as_str())
	}

	fn message(&self) -> Option<&str> {
		self.get("data")
			.and_then(|d| d.get("message"))
			.and_then(|m| m.as_str())
			.or_else(|| self.get("message").and_then(|m| m.as_str()))
	}

	fn code(&self) -> Option<i64> {
		self.get("code").and_then(|c| c.as_i64())
	}

	fn cause(&self) -> Option<&Self> {
		self.get("error")
			.filter(|e| e.is_object())
			.or_else(|| {
				self.get("data")
					.and_then(|d| d.get("originalError"))
					.filter(|e| e.is_object())
			})
	}
}

/// Iterates over an error and its causes, at most [`MAX_CAUSE_DEPTH`] links.
fn cause_chain<E: ErrorCause + ?Sized>(error: &E) -> impl Iterator<Item = &E> {
	std::iter::successors(Some(error), |e| e.cause()).take(MAX_CAUSE_DEPTH)
}

/// Finds the most specific reason in the chain, without the
/// `execution reverted: ` prefix.
///
/// Each link's `reason`, `data.message` or `message` replaces the candidate
/// found so far; a `reason` also stops the walk.
pub fn extract_reason<E: ErrorCause + ?Sized>(error: &E) -> Option<String> {
	let mut candidate = None;
	for link in cause_chain(error) {
		if let Some(reason) = link.reason() {
			candidate = Some(reason);
			break;
		}
		if let Some(message) = link.message() {
			candidate = Some(message);
		}
	}

	candidate.map(|reason| {
		reason
			.strip_prefix(REVERT_PREFIX)
			.unwrap_or(reason)
			.to_string()
	})
}

/// True when any link carries the wallet's user-declined code.
pub fn is_user_rejected<E: ErrorCause + ?Sized>(error: &E) -> bool {
	cause_chain(error).any(|link| link.code() == Some(ProviderError::USER_REJECTED_CODE))
}

/// Maps revert reasons to user-facing messages.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
	messages: HashMap<String, String>,
}

impl Default for ErrorClassifier {
	fn default() -> Self {
		Self::new(&HashMap::new())
	}
}

impl ErrorClassifier {
	/// Built-in table extended (and overridden) by `extra`.
	pub fn new(extra: &HashMap<String, String>) -> Self {
		let mut messages: HashMap<String, String> = KNOWN_REVERTS
			.iter()
			.map(|(reason, message)| (reason.to_string(), message.to_string()))
			.collect();
		messages.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
		Self { messages }
	}

	pub fn classify<E: ErrorCause + ?Sized>(&self, error: &E) -> String {
		match extract_reason(error) {
			Some(reason) if reason.is_empty() => "Unknown error".to_string(),
			Some(reason) => match self.messages.get(&reason) {
				Some(message) => message.clone(),
				None => format!("Unknown error: \"{}\"", reason),
			},
			None => "Unknown error".to_string(),
		}
	}

	pub fn classify_provider_error(&self, error: &ProviderError) -> String {
		self.classify(error.payload())
	}
}

/// Classifies with the built-in table only.
pub fn trade_error_to_user_readable_message(error: &serde_json::Value) -> String {
	ErrorClassifier::default().classify(error)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	const PARTNER_MESSAGE: &str = "This transaction will not succeed due to an invalid partner ID. Try registering an address via PartnerManager.";

	#[test]
	fn test_nested_known_revert() {
		let error = json!({
			"error": { "data": { "message": "execution reverted: Synchronizer: INVALID_PARTNER_ID" } }
		});
		assert_eq!(trade_error_to_user_readable_message(&error), PARTNER_MESSAGE);
	}

	#[test]
	fn test_unmapped_reason() {
		let error = json!({ "message": "execution reverted: Some Unmapped Reason" });
		assert_eq!(
			trade_error_to_user_readable_message(&error),
			"Unknown error: \"Some Unmapped Reason\""
		);
	}

	#[test]
	fn test_no_reason_anywhere() {
		let error = json!({ "code": -32000, "error": { "data": { "originalError": {} } } });
		assert_eq!(trade_error_to_user_readable_message(&error), "Unknown error");
		assert_eq!(trade_error_to_user_readable_message(&json!(null)), "Unknown error");
		assert_eq!(
			trade_error_to_user_readable_message(&json!({ "reason": "" })),
			"Unknown error"
		);
	}

	#[test]
	fn test_reason_stops_walk() {
		let error = json!({
			"reason": "Synchronizer: INVALID_PARTNER_ID",
			"error": { "message": "something deeper" }
		});
		assert_eq!(trade_error_to_user_readable_message(&error), PARTNER_MESSAGE);
	}

	#[test]
	fn test_deeper_message_replaces_outer() {
		let error = json!({
			"message": "Internal JSON-RPC error.",
			"data": {
				"originalError": { "message": "execution reverted: Synchronizer: EXPIRED_SIGNATURE" }
			}
		});
		assert_eq!(
			extract_reason(&error).as_deref(),
			Some("Synchronizer: EXPIRED_SIGNATURE")
		);
	}

	#[test]
	fn test_prefix_only_stripped_at_start() {
		let error = json!({ "message": "call failed: execution reverted: X" });
		assert_eq!(
			extract_reason(&error).as_deref(),
			Some("call failed: execution reverted: X")
		);
	}

	#[test]
	fn test_walk_is_bounded() {
		let mut error = json!({ "message": "execution reverted: innermost" });
		for _ in 0..(MAX_CAUSE_DEPTH * 2) {
			error = json!({ "error": error });
		}
		// The innermost message lies beyond the depth limit.
		assert_eq!(extract_reason(&error), None);
	}

	#[test]
	fn test_configured_messages_override() {
		let mut extra = HashMap::new();
		extra.insert(
			"Synchronizer: EXPIRED_SIGNATURE".to_string(),
			"Price expired, try again.".to_string(),
		);
		extra.insert(
			"Synchronizer: INVALID_PARTNER_ID".to_string(),
			"Partner not registered.".to_string(),
		);
		let classifier = ErrorClassifier::new(&extra);

		assert_eq!(
			classifier.classify(&json!({ "reason": "Synchronizer: EXPIRED_SIGNATURE" })),
			"Price expired, try again."
		);
		assert_eq!(
			classifier.classify(&json!({ "reason": "Synchronizer: INVALID_PARTNER_ID" })),
			"Partner not registered."
		);
	}

	#[test]
	fn test_user_rejection_detection() {
		assert!(is_user_rejected(&json!({ "code": 4001, "reason": "anything" })));
		assert!(is_user_rejected(&json!({ "error": { "code": 4001 } })));
		assert!(!is_user_rejected(&json!({ "code": -32603, "message": "4001" })));
	}
}
