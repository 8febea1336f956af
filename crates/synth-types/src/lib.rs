//! Common types module for the synthetic-asset trading workspace.
//!
//! This module defines the data types shared by every stage of the trade
//! pipeline: currencies and amounts, trade intents, oracle signature packets,
//! contract call payloads and wallet transaction requests. Keeping them in one
//! crate lets the resolver, builder and executor agree on a single vocabulary.

/// Currency and amount types.
pub mod currency;
/// Wallet transaction, call payload and provider error types.
pub mod delivery;
/// Network, token and synchronizer configuration types.
pub mod networks;
/// Oracle signature types.
pub mod oracle;
/// Base registry trait for pluggable implementations.
pub mod registry;
/// Secret string wrapper for private keys and API tokens.
pub mod secret_string;
/// Trade intent and session types.
pub mod trade;
/// Utility functions for formatting and timestamps.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use currency::*;
pub use delivery::*;
pub use networks::{NativeCurrencyConfig, NetworkConfig, NetworksConfig, TokenConfig};
pub use oracle::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use trade::*;
pub use utils::{
	current_timestamp, format_token_amount, truncate_hash, with_0x_prefix, without_0x_prefix,
};
pub use validation::*;

pub use alloy_primitives::{Address, Bytes, U256};
