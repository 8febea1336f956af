//! Currency and amount types.
//!
//! A currency is either the chain's native coin or an ERC-20 token. Every
//! currency that takes part in a trade must be resolvable to a wrapped token,
//! because the synchronizer contract only knows token addresses.

use crate::utils::format_token_amount;
use alloy_primitives::{Address, U256};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when converting decimal amounts to base units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
	#[error("Invalid amount '{0}'")]
	Invalid(String),
	#[error("Amount cannot be negative: {0}")]
	Negative(String),
	#[error("Amount {amount} has more than {decimals} decimal places")]
	TooPrecise { amount: String, decimals: u8 },
	#[error("Amount {0} does not fit in 256 bits")]
	Overflow(String),
}

/// An ERC-20 token on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
	pub chain_id: u64,
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

/// The native coin of a chain.
///
/// `wrapped` is the token contract standing in for the native coin on-chain.
/// It is optional because not every deployment configures one; a native
/// currency without a wrapper cannot be traded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeCurrency {
	pub chain_id: u64,
	pub symbol: String,
	pub decimals: u8,
	pub wrapped: Option<Token>,
}

/// A tradeable currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
	Native(NativeCurrency),
	Token(Token),
}

impl Currency {
	pub fn symbol(&self) -> &str {
		match self {
			Currency::Native(native) => &native.symbol,
			Currency::Token(token) => &token.symbol,
		}
	}

	pub fn decimals(&self) -> u8 {
		match self {
			Currency::Native(native) => native.decimals,
			Currency::Token(token) => token.decimals,
		}
	}

	pub fn chain_id(&self) -> u64 {
		match self {
			Currency::Native(native) => native.chain_id,
			Currency::Token(token) => token.chain_id,
		}
	}

	pub fn is_native(&self) -> bool {
		matches!(self, Currency::Native(_))
	}

	/// Returns the token contract that represents this currency on-chain.
	///
	/// Tokens wrap to themselves; native coins wrap to their configured
	/// wrapper, if any.
	pub fn wrapped(&self) -> Option<&Token> {
		match self {
			Currency::Native(native) => native.wrapped.as_ref(),
			Currency::Token(token) => Some(token),
		}
	}
}

impl From<Token> for Currency {
	fn from(token: Token) -> Self {
		Currency::Token(token)
	}
}

impl fmt::Display for Currency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// An amount of a currency, stored as an integer number of base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
	currency: Currency,
	raw: U256,
}

impl CurrencyAmount {
	/// Creates an amount from an integer number of base units.
	pub fn from_raw(currency: Currency, raw: U256) -> Self {
		Self { currency, raw }
	}

	/// Parses a human-readable decimal amount such as `"1.5"` into base units.
	///
	/// The amount may not carry more fractional digits than the currency has
	/// decimals. Digit separators (`1_000`) are rejected.
	pub fn parse(currency: Currency, amount: &str) -> Result<Self, AmountError> {
		if amount.contains('_') {
			return Err(AmountError::Invalid(amount.to_string()));
		}
		let value = Decimal::from_str(amount.trim())
			.map_err(|_| AmountError::Invalid(amount.to_string()))?;

		if value.is_sign_negative() && !value.is_zero() {
			return Err(AmountError::Negative(amount.to_string()));
		}

		let decimals = currency.decimals();
		let scale = value.scale();
		if scale > u32::from(decimals) {
			return Err(AmountError::TooPrecise {
				amount: amount.to_string(),
				decimals,
			});
		}

		let mantissa = U256::from(value.mantissa().unsigned_abs());
		let exponent = U256::from(u32::from(decimals) - scale);
		let raw = U256::from(10u8)
			.checked_pow(exponent)
			.and_then(|factor| mantissa.checked_mul(factor))
			.ok_or_else(|| AmountError::Overflow(amount.to_string()))?;

		Ok(Self { currency, raw })
	}

	pub fn currency(&self) -> &Currency {
		&self.currency
	}

	/// Integer base-unit value.
	pub fn raw(&self) -> U256 {
		self.raw
	}

	pub fn is_zero(&self) -> bool {
		self.raw.is_zero()
	}

	/// Base-unit value as a `0x`-prefixed hexadecimal string.
	pub fn to_hex(&self) -> String {
		format!("{:#x}", self.raw)
	}

	/// Full-precision decimal rendering, trailing zeros removed.
	pub fn to_exact(&self) -> String {
		format_token_amount(&self.raw.to_string(), self.currency.decimals())
	}

	/// Decimal rendering rounded half-up to `digits` significant digits.
	///
	/// Falls back to the exact rendering when the value exceeds what a
	/// `Decimal` can hold.
	pub fn to_significant(&self, digits: u32) -> String {
		let exact = self.to_exact();
		Decimal::from_str(&exact)
			.ok()
			.and_then(|value| {
				value.round_sf_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
			})
			.map(|rounded| rounded.normalize().to_string())
			.unwrap_or(exact)
	}

	/// Multiplies the amount by a non-negative fraction, rounding down.
	pub fn multiply(&self, fraction: Decimal) -> Self {
		let numerator = U256::from(fraction.mantissa().unsigned_abs());
		let denominator = U256::from(10u8).pow(U256::from(fraction.scale()));
		let raw = self
			.raw
			.checked_mul(numerator)
			.map(|product| product / denominator)
			.unwrap_or(U256::MAX);

		Self {
			currency: self.currency.clone(),
			raw,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn dei() -> Currency {
		Currency::Token(Token {
			chain_id: 56,
			address: address!("de12c7959e1a72bbe8a5f7a1dc8f8eef9ab011b3"),
			symbol: "DEI".to_string(),
			decimals: 18,
			name: None,
		})
	}

	fn usdc() -> Currency {
		Currency::Token(Token {
			chain_id: 56,
			address: address!("8ac76a51cc950d9822d68b83fe1ad97b32cd580d"),
			symbol: "USDC".to_string(),
			decimals: 6,
			name: None,
		})
	}

	#[test]
	fn test_parse_scales_to_base_units() {
		let amount = CurrencyAmount::parse(dei(), "100").unwrap();
		assert_eq!(
			amount.raw(),
			U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64))
		);

		let amount = CurrencyAmount::parse(usdc(), "1.5").unwrap();
		assert_eq!(amount.raw(), U256::from(1_500_000u64));
		assert_eq!(amount.to_hex(), "0x16e360");
	}

	#[test]
	fn test_parse_rejects_bad_input() {
		assert!(matches!(
			CurrencyAmount::parse(usdc(), "abc"),
			Err(AmountError::Invalid(_))
		));
		assert!(matches!(
			CurrencyAmount::parse(usdc(), "-1"),
			Err(AmountError::Negative(_))
		));
		assert!(matches!(
			CurrencyAmount::parse(usdc(), "0.0000001"),
			Err(AmountError::TooPrecise { decimals: 6, .. })
		));
	}

	#[test]
	fn test_parse_rejects_digit_separators() {
		assert!(matches!(
			CurrencyAmount::parse(usdc(), "1_000"),
			Err(AmountError::Invalid(_))
		));
		assert!(CurrencyAmount::parse(usdc(), "1000").is_ok());
	}

	#[test]
	fn test_significant_rendering() {
		let amount = CurrencyAmount::parse(dei(), "100").unwrap();
		assert_eq!(amount.to_significant(6), "100");

		let amount = CurrencyAmount::parse(dei(), "81.3008130081").unwrap();
		assert_eq!(amount.to_significant(6), "81.3008");
		assert_eq!(amount.to_exact(), "81.3008130081");

		let amount = CurrencyAmount::from_raw(usdc(), U256::from(123_457u64));
		assert_eq!(amount.to_significant(3), "0.123");
	}

	#[test]
	fn test_multiply_by_fraction() {
		let amount = CurrencyAmount::parse(usdc(), "200").unwrap();
		let fee = amount.multiply(Decimal::from_str("0.003").unwrap());
		assert_eq!(fee.to_exact(), "0.6");
		assert_eq!(fee.currency().symbol(), "USDC");
	}

	#[test]
	fn test_native_wrapping() {
		let bare = Currency::Native(NativeCurrency {
			chain_id: 56,
			symbol: "BNB".to_string(),
			decimals: 18,
			wrapped: None,
		});
		assert!(bare.wrapped().is_none());
		assert!(bare.is_native());

		let wbnb = Token {
			chain_id: 56,
			address: address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"),
			symbol: "WBNB".to_string(),
			decimals: 18,
			name: None,
		};
		let wrapped = Currency::Native(NativeCurrency {
			chain_id: 56,
			symbol: "BNB".to_string(),
			decimals: 18,
			wrapped: Some(wbnb.clone()),
		});
		assert_eq!(wrapped.wrapped(), Some(&wbnb));
		assert_eq!(dei().wrapped().map(|t| t.symbol.as_str()), Some("DEI"));
	}
}
