//! String formatting utilities.
//!
//! Hex prefix handling, base-unit amount rendering, and hash shortening for
//! log lines and history listings.

/// Shortens a hash for display as `0x1234...cdef`.
///
/// Strings of ten characters or fewer are returned unchanged.
pub fn truncate_hash(hash: &str) -> String {
	if hash.len() <= 10 || !hash.is_ascii() {
		hash.to_string()
	} else {
		format!("{}...{}", &hash[..6], &hash[hash.len() - 4..])
	}
}

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Renders an integer base-unit amount as a decimal string.
///
/// `format_token_amount("1500000", 6)` yields `"1.5"`. Trailing fractional
/// zeros are dropped, so whole amounts carry no decimal point.
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
	let digits = amount.trim_start_matches('0');
	if digits.is_empty() {
		return "0".to_string();
	}

	let places = decimals as usize;
	if places == 0 {
		return digits.to_string();
	}

	let padded = format!("{:0>width$}", digits, width = places + 1);
	let (integer, fraction) = padded.split_at(padded.len() - places);
	let fraction = fraction.trim_end_matches('0');

	if fraction.is_empty() {
		integer.to_string()
	} else {
		format!("{}.{}", integer, fraction)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_hash() {
		assert_eq!(truncate_hash("0x0abc"), "0x0abc");
		assert_eq!(
			truncate_hash("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
			"0x5fbd...0aa3"
		);
	}

	#[test]
	fn test_prefix_helpers() {
		assert_eq!(with_0x_prefix("abc"), "0xabc");
		assert_eq!(with_0x_prefix("0Xabc"), "0Xabc");
		assert_eq!(without_0x_prefix("0xabc"), "abc");
		assert_eq!(without_0x_prefix("abc"), "abc");
	}

	#[test]
	fn test_format_token_amount() {
		assert_eq!(format_token_amount("100000000000000000000", 18), "100");
		assert_eq!(format_token_amount("1230000000000000000", 18), "1.23");
		assert_eq!(format_token_amount("1", 18), "0.000000000000000001");
		assert_eq!(format_token_amount("1500000", 6), "1.5");
		assert_eq!(format_token_amount("0", 6), "0");
		assert_eq!(format_token_amount("42", 0), "42");
	}
}
