//! Pre-submission quote.
//!
//! What the confirmation step shows before anything is sent: the trade
//! summary, the fee charged by the synthetic asset, and the amount received.

use rust_decimal::Decimal;
use synth_types::{CurrencyAmount, TradeIntent, TradeType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuote {
	pub summary: String,
	/// Fee in the collateral currency; `None` when the fee or the amount it
	/// applies to is unknown.
	pub fee_amount: Option<CurrencyAmount>,
	/// e.g. `0.3% / 0.3 DEI`, empty when there is no fee amount.
	pub fee_label: String,
	pub minimum_received: Option<String>,
}

/// Builds a quote for `intent` given the synthetic asset's fee fraction.
///
/// The fee is taken from the collateral side: the amount paid in when
/// opening, the amount received when closing.
pub fn quote(intent: &TradeIntent, fee: Option<Decimal>) -> TradeQuote {
	let collateral = match intent.trade_type {
		TradeType::Open => intent.amount_in.as_ref(),
		TradeType::Close => intent.amount_out.as_ref(),
	};

	let fee_amount = fee.zip(collateral).map(|(fee, amount)| amount.multiply(fee));
	let fee_label = match (fee, &fee_amount) {
		(Some(fee), Some(amount)) => format!(
			"{}% / {} {}",
			(fee * Decimal::ONE_HUNDRED).normalize(),
			amount.to_exact(),
			amount.currency().symbol()
		),
		_ => String::new(),
	};

	TradeQuote {
		summary: intent.summary(),
		fee_amount,
		fee_label,
		minimum_received: intent
			.amount_out
			.as_ref()
			.map(|amount| format!("{} {}", amount.to_significant(6), amount.currency().symbol())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use synth_types::{Address, Currency, Token};

	fn token(symbol: &str, byte: u8) -> Currency {
		Currency::Token(Token {
			chain_id: 56,
			address: Address::repeat_byte(byte),
			symbol: symbol.to_string(),
			decimals: 18,
			name: None,
		})
	}

	fn intent(trade_type: TradeType) -> TradeIntent {
		let dei = token("DEI", 0xde);
		let tsla = token("TSLA", 0x11);
		let (currency_in, currency_out, amount_in, amount_out) = match trade_type {
			TradeType::Open => (dei.clone(), tsla.clone(), ("100", dei), ("0.5", tsla)),
			TradeType::Close => (tsla.clone(), dei.clone(), ("0.5", tsla), ("100", dei)),
		};
		TradeIntent {
			currency_in: Some(currency_in),
			currency_out: Some(currency_out),
			amount_in: Some(CurrencyAmount::parse(amount_in.1, amount_in.0).unwrap()),
			amount_out: Some(CurrencyAmount::parse(amount_out.1, amount_out.0).unwrap()),
			trade_type,
		}
	}

	#[test]
	fn test_open_fee_on_amount_in() {
		let quote = quote(&intent(TradeType::Open), Some(Decimal::new(3, 3)));
		assert_eq!(quote.fee_amount.as_ref().unwrap().to_exact(), "0.3");
		assert_eq!(quote.fee_label, "0.3% / 0.3 DEI");
		assert_eq!(quote.summary, "Trade 100 DEI for 0.5 TSLA");
		assert_eq!(quote.minimum_received.as_deref(), Some("0.5 TSLA"));
	}

	#[test]
	fn test_close_fee_on_amount_out() {
		let quote = quote(&intent(TradeType::Close), Some(Decimal::new(1, 2)));
		assert_eq!(quote.fee_label, "1% / 1 DEI");
	}

	#[test]
	fn test_no_fee() {
		let quote = quote(&intent(TradeType::Open), None);
		assert_eq!(quote.fee_amount, None);
		assert_eq!(quote.fee_label, "");
	}
}
