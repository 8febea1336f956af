//! Wallet transaction types.
//!
//! This module defines the payload produced by the call builder, the
//! transaction request handed to the wallet provider, and the raw error shape
//! the provider reports back.

use crate::utils::with_0x_prefix;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain transaction hash representation.
///
/// Stores transaction hashes as raw bytes to support different blockchain formats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", with_0x_prefix(&hex::encode(&self.0)))
	}
}

/// Encoded contract call, ready to be wrapped into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPayload {
	/// Contract the call is addressed to.
	pub target: Address,
	/// ABI-encoded function selector and arguments.
	pub call_data: Bytes,
	/// Native amount sent along with the call.
	pub value: U256,
}

/// Transaction request in the shape the wallet provider expects.
///
/// `value` is present only when nonzero and `gas_limit` only once an estimate
/// was obtained; an omitted field is not the same as an explicit zero to the
/// contract layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
	#[serde(skip)]
	pub chain_id: u64,
	pub from: Address,
	pub to: Address,
	pub data: Bytes,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_limit: Option<u64>,
}

impl TransactionRequest {
	/// Builds a request from a call payload.
	pub fn new(chain_id: u64, from: Address, payload: &CallPayload) -> Self {
		Self {
			chain_id,
			from,
			to: payload.target,
			data: payload.call_data.clone(),
			value: (!payload.value.is_zero()).then_some(payload.value),
			gas_limit: None,
		}
	}

	pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}
}

/// Error reported by a wallet or RPC provider.
///
/// Providers wrap errors in each other with no fixed schema (`error`,
/// `data.originalError`, ...), so the payload is kept as raw JSON for the
/// classifier to walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
	payload: serde_json::Value,
}

impl ProviderError {
	/// EIP-1193 code for a request the user declined in the wallet.
	pub const USER_REJECTED_CODE: i64 = 4001;

	pub fn new(payload: serde_json::Value) -> Self {
		Self { payload }
	}

	/// Creates an error that only carries a message.
	pub fn from_message(message: impl Into<String>) -> Self {
		Self {
			payload: serde_json::json!({ "message": message.into() }),
		}
	}

	pub fn payload(&self) -> &serde_json::Value {
		&self.payload
	}

	/// Top-level numeric error code, if any.
	pub fn code(&self) -> Option<i64> {
		self.payload.get("code").and_then(|c| c.as_i64())
	}

	/// Top-level message, or the whole payload when there is none.
	pub fn message(&self) -> String {
		match self.payload.get("message").and_then(|m| m.as_str()) {
			Some(message) => message.to_string(),
			None => self.payload.to_string(),
		}
	}
}

impl fmt::Display for ProviderError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message())
	}
}

impl std::error::Error for ProviderError {}
