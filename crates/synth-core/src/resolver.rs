//! Registrar resolution.
//!
//! The registrar is the synthetic asset's own token: the output side when
//! opening a position, the input side when closing it.

use crate::TradeError;
use synth_types::{Address, Currency, TradeIntent, TradeType};

/// Returns the registrar address the trade operates on.
///
/// Both currencies must be present and have an ERC-20 wrapper even though
/// only one side is used.
pub fn resolve_registrar(intent: &TradeIntent) -> Result<Address, TradeError> {
	let wrapped = |currency: &Option<Currency>, side: &str| {
		currency
			.as_ref()
			.and_then(|c| c.wrapped().map(|token| token.address))
			.ok_or_else(|| TradeError::MissingDependency(format!("{} currency", side)))
	};

	let input = wrapped(&intent.currency_in, "input")?;
	let output = wrapped(&intent.currency_out, "output")?;

	Ok(match intent.trade_type {
		TradeType::Open => output,
		TradeType::Close => input,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use synth_types::{NativeCurrency, Token};

	fn token(symbol: &str, byte: u8) -> Currency {
		Currency::Token(Token {
			chain_id: 56,
			address: Address::repeat_byte(byte),
			symbol: symbol.to_string(),
			decimals: 18,
			name: None,
		})
	}

	fn intent(
		currency_in: Option<Currency>,
		currency_out: Option<Currency>,
		trade_type: TradeType,
	) -> TradeIntent {
		TradeIntent {
			currency_in,
			currency_out,
			amount_in: None,
			amount_out: None,
			trade_type,
		}
	}

	#[test]
	fn test_open_uses_output_side() {
		let open = intent(Some(token("DEI", 0xde)), Some(token("SYM", 0x51)), TradeType::Open);
		assert_eq!(resolve_registrar(&open).unwrap(), Address::repeat_byte(0x51));
	}

	#[test]
	fn test_close_uses_input_side() {
		let close = intent(Some(token("SYM", 0x51)), Some(token("DEI", 0xde)), TradeType::Close);
		assert_eq!(resolve_registrar(&close).unwrap(), Address::repeat_byte(0x51));
	}

	#[test]
	fn test_missing_currency() {
		for trade_type in [TradeType::Open, TradeType::Close] {
			let missing_in = intent(None, Some(token("SYM", 0x51)), trade_type);
			assert!(matches!(
				resolve_registrar(&missing_in),
				Err(TradeError::MissingDependency(_))
			));
			let missing_out = intent(Some(token("DEI", 0xde)), None, trade_type);
			assert!(matches!(
				resolve_registrar(&missing_out),
				Err(TradeError::MissingDependency(_))
			));
		}
	}

	#[test]
	fn test_unwrapped_native_is_missing() {
		let bnb = Currency::Native(NativeCurrency {
			chain_id: 56,
			symbol: "BNB".into(),
			decimals: 18,
			wrapped: None,
		});
		let close = intent(Some(bnb), Some(token("DEI", 0xde)), TradeType::Close);
		assert!(resolve_registrar(&close).is_err());
	}
}
