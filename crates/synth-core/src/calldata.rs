//! Synchronizer call encoding.

use crate::CallBuildFailure;
use alloy_sol_types::{sol, SolCall};
use synth_types::{
	Address, Bytes, CallPayload, CurrencyAmount, SignaturePacket, TradeType, U256,
};
use tracing::debug;

sol! {
	/// Schnorr signature of one oracle node, as the synchronizer verifies it.
	#[derive(Debug, PartialEq, Eq)]
	struct SchnorrSign {
		uint256 signature;
		address owner;
		address nonce;
	}

	interface ISynchronizer {
		function buyFor(
			address partnerId,
			address user,
			address registrar,
			uint256 amountIn,
			uint256 price,
			uint256 timestamp,
			bytes reqId,
			SchnorrSign[] sigs
		) external;

		function sellFor(
			address partnerId,
			address user,
			address registrar,
			uint256 amountIn,
			uint256 price,
			uint256 timestamp,
			bytes reqId,
			SchnorrSign[] sigs
		) external;
	}
}

/// Everything needed to encode one `buyFor`/`sellFor` call.
#[derive(Debug, Clone)]
pub struct CallInputs<'a> {
	pub trade_type: TradeType,
	/// Synchronizer contract of the chain.
	pub target: Address,
	pub partner_id: Option<Address>,
	pub account: Option<Address>,
	pub registrar: Address,
	pub amount_in: Option<&'a CurrencyAmount>,
	pub packet: &'a SignaturePacket,
}

fn sigs(packet: &SignaturePacket) -> Vec<SchnorrSign> {
	packet
		.signatures
		.iter()
		.map(|s| SchnorrSign {
			signature: s.signature,
			owner: s.owner,
			nonce: s.nonce,
		})
		.collect()
}

/// Encodes the trade call.
///
/// Arguments are positional and identical for both directions:
/// `partnerId, user, registrar, amountIn, price, timestamp, reqId, sigs`.
/// A missing input is returned as a [`CallBuildFailure`] carrying the target.
pub fn build_trade_call(inputs: &CallInputs<'_>) -> Result<CallPayload, CallBuildFailure> {
	let fail = |reason: &str| CallBuildFailure {
		target: inputs.target,
		reason: reason.to_string(),
	};

	let partner_id = inputs.partner_id.ok_or_else(|| fail("partner id is not set"))?;
	let user = inputs.account.ok_or_else(|| fail("no account connected"))?;
	let amount_in = inputs.amount_in.ok_or_else(|| fail("no input amount"))?;
	if inputs.registrar == Address::ZERO {
		return Err(fail("registrar is the zero address"));
	}
	if inputs.target == Address::ZERO {
		return Err(fail("synchronizer is the zero address"));
	}

	let packet = inputs.packet;
	debug!(
		method = inputs.trade_type.method_name(),
		partner_id = %partner_id,
		user = %user,
		registrar = %inputs.registrar,
		amount_in = %amount_in.to_hex(),
		price = %packet.price,
		timestamp = %packet.timestamp,
		request_id = %packet.request_id,
		signatures = packet.signatures.len(),
		"Contract arguments"
	);

	let call_data = match inputs.trade_type {
		TradeType::Open => ISynchronizer::buyForCall {
			partnerId: partner_id,
			user,
			registrar: inputs.registrar,
			amountIn: amount_in.raw(),
			price: packet.price,
			timestamp: packet.timestamp,
			reqId: packet.request_id.clone(),
			sigs: sigs(packet),
		}
		.abi_encode(),
		TradeType::Close => ISynchronizer::sellForCall {
			partnerId: partner_id,
			user,
			registrar: inputs.registrar,
			amountIn: amount_in.raw(),
			price: packet.price,
			timestamp: packet.timestamp,
			reqId: packet.request_id.clone(),
			sigs: sigs(packet),
		}
		.abi_encode(),
	};

	Ok(CallPayload {
		target: inputs.target,
		call_data: Bytes::from(call_data),
		value: U256::ZERO,
	})
}
