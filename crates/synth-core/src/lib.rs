//! Trade submission core.
//!
//! This crate assembles a synthetic-asset trade into a synchronizer contract
//! call and submits it: the registrar is resolved from the intent, a signed
//! price is fetched from the oracle, the call is encoded and then estimated,
//! broadcast and registered. Provider failures are classified into messages
//! the trader can act on.

pub mod builder;
pub mod calldata;
pub mod classify;
pub mod engine;
mod error;
pub mod executor;
pub mod partner;
pub mod quote;
pub mod resolver;
pub mod state;

pub use builder::{BuilderError, EngineBuilder, TradeFactories};
pub use classify::{trade_error_to_user_readable_message, ErrorCause, ErrorClassifier};
pub use engine::{TradeCallbackState, TradeEngine};
pub use error::{CallBuildFailure, TradeError};
pub use executor::{calculate_gas_margin, SubmissionExecutor};
pub use partner::{PartnerIdProvider, StaticPartnerId};
pub use quote::TradeQuote;
