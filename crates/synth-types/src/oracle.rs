//! Oracle signature types.
//!
//! The signing network attests to a price for a registrar at a point in time.
//! The synchronizer contract verifies these attestations before minting or
//! burning the synthetic asset.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// One Schnorr signature from a signing-network node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrSignature {
	pub signature: U256,
	pub owner: Address,
	pub nonce: Address,
}

/// Signed price attestation for a (registrar, action, chain) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePacket {
	/// Price in 18-decimal fixed point.
	pub price: U256,
	pub timestamp: U256,
	pub request_id: Bytes,
	pub signatures: Vec<SchnorrSignature>,
}

/// Reply of the signing network.
///
/// Failures are values, not errors: the caller must inspect `success` before
/// touching `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<SignaturePacket>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl OracleResponse {
	pub fn success(data: SignaturePacket) -> Self {
		Self {
			success: true,
			data: Some(data),
			error: None,
		}
	}

	pub fn failure(error: impl Into<String>) -> Self {
		Self {
			success: false,
			data: None,
			error: Some(error.into()),
		}
	}
}
