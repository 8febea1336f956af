//! Trade engine.
//!
//! Runs one trade attempt through the pipeline: resolve the registrar, fetch
//! oracle signatures, encode the synchronizer call and hand it to the
//! submission executor. Attempts are independent; the engine keeps no state
//! between them and holds only shared, read-only service handles.

use crate::calldata::{build_trade_call, CallInputs};
use crate::executor::{SubmissionContext, SubmissionExecutor};
use crate::partner::PartnerIdProvider;
use crate::quote::{quote, TradeQuote};
use crate::resolver::resolve_registrar;
use crate::state::{SubmissionState, SubmissionTracker};
use crate::TradeError;
use std::fmt;
use std::sync::Arc;
use synth_account::{AccountError, AccountService};
use synth_history::{HistoryError, HistoryService, TransactionRecord};
use synth_oracle::OracleService;
use synth_types::{
	truncate_hash, Address, NetworksConfig, SignaturePacket, TradeAction, TradeIntent,
	TradeSession, TransactionHash,
};
use tracing::instrument;

const MISSING_DEPENDENCIES: &str = "Missing dependencies";
const NO_AMOUNT: &str = "No amount provided";

/// Whether a trade can be attempted with what is known so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeCallbackState {
	Valid,
	Invalid(String),
}

impl fmt::Display for TradeCallbackState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TradeCallbackState::Valid => write!(f, "valid"),
			TradeCallbackState::Invalid(reason) => write!(f, "{}", reason),
		}
	}
}

/// Session and network values an attempt cannot start without.
struct Dependencies {
	account: Address,
	chain_id: u64,
	synchronizer: Address,
	registrar: Address,
}

pub struct TradeEngine {
	networks: NetworksConfig,
	default_chain_id: Option<u64>,
	account: Arc<AccountService>,
	oracle: Arc<OracleService>,
	history: Arc<HistoryService>,
	partner: Arc<dyn PartnerIdProvider>,
	executor: SubmissionExecutor,
}

impl TradeEngine {
	pub fn new(
		networks: NetworksConfig,
		default_chain_id: Option<u64>,
		account: Arc<AccountService>,
		oracle: Arc<OracleService>,
		history: Arc<HistoryService>,
		partner: Arc<dyn PartnerIdProvider>,
		executor: SubmissionExecutor,
	) -> Self {
		Self {
			networks,
			default_chain_id,
			account,
			oracle,
			history,
			partner,
			executor,
		}
	}

	pub fn networks(&self) -> &NetworksConfig {
		&self.networks
	}

	/// Session of the configured account on the default chain.
	pub async fn default_session(&self) -> Result<TradeSession, AccountError> {
		Ok(TradeSession {
			chain_id: self.default_chain_id,
			account: Some(self.account.get_address().await?),
		})
	}

	/// Checks the intent and session without touching the network.
	pub fn callback_state(&self, intent: &TradeIntent, session: &TradeSession) -> TradeCallbackState {
		if self.dependencies(intent, session).is_err() {
			return TradeCallbackState::Invalid(MISSING_DEPENDENCIES.to_string());
		}
		match &intent.amount_in {
			Some(amount) if !amount.is_zero() => TradeCallbackState::Valid,
			_ => TradeCallbackState::Invalid(NO_AMOUNT.to_string()),
		}
	}

	/// Quote for the confirmation step.
	///
	/// The fee is the one configured for the synthetic asset on the session's
	/// chain; none is applied when either is unknown.
	pub fn quote(&self, intent: &TradeIntent, session: &TradeSession) -> TradeQuote {
		let fee = session
			.chain_id
			.and_then(|chain_id| self.networks.get(&chain_id))
			.zip(resolve_registrar(intent).ok())
			.and_then(|(network, registrar)| network.token_by_address(&registrar))
			.and_then(|token| token.fee);
		quote(intent, fee)
	}

	/// Submits the trade and returns its transaction hash.
	///
	/// Exactly one signature request and one call are made per invocation;
	/// nothing is retried.
	#[instrument(skip_all, fields(trade_type = %intent.trade_type, chain_id = ?session.chain_id))]
	pub async fn execute(
		&self,
		intent: &TradeIntent,
		session: &TradeSession,
	) -> Result<TransactionHash, TradeError> {
		let mut tracker = SubmissionTracker::new();
		match self.run(intent, session, &mut tracker).await {
			Ok(hash) => {
				tracing::info!(tx_hash = %truncate_hash(&hash.to_string()), "Trade submitted");
				Ok(hash)
			}
			Err(e) => {
				tracker.fail();
				tracing::error!(error = %e, "Trade failed");
				Err(e)
			}
		}
	}

	async fn run(
		&self,
		intent: &TradeIntent,
		session: &TradeSession,
		tracker: &mut SubmissionTracker,
	) -> Result<TransactionHash, TradeError> {
		let deps = self.dependencies(intent, session)?;
		let amount_in = intent
			.amount_in
			.as_ref()
			.filter(|amount| !amount.is_zero())
			.ok_or_else(|| TradeError::MissingDependency("amount in".to_string()))?;

		let action = intent.trade_type.oracle_action();
		let packet = self
			.fetch_signatures(deps.registrar, action, deps.chain_id)
			.await?;

		let payload = build_trade_call(&CallInputs {
			trade_type: intent.trade_type,
			target: deps.synchronizer,
			partner_id: self.partner.partner_id(deps.chain_id),
			account: Some(deps.account),
			registrar: deps.registrar,
			amount_in: Some(amount_in),
			packet: &packet,
		})
		.map_err(|failure| {
			tracing::error!(
				target_contract = %failure.target,
				reason = %failure.reason,
				"Failed to construct calldata"
			);
			TradeError::CallBuild(failure)
		})?;
		tracker
			.advance(SubmissionState::CallConstructed)
			.map_err(|e| TradeError::Submission(e.to_string()))?;

		let context = SubmissionContext {
			chain_id: deps.chain_id,
			from: deps.account,
			summary: intent.summary(),
		};
		self.executor.submit(&payload, &context, tracker).await
	}

	fn dependencies(
		&self,
		intent: &TradeIntent,
		session: &TradeSession,
	) -> Result<Dependencies, TradeError> {
		let missing = |what: &str| TradeError::MissingDependency(what.to_string());

		let account = session.account.ok_or_else(|| missing("account"))?;
		let chain_id = session.chain_id.ok_or_else(|| missing("chain"))?;
		let network = self
			.networks
			.get(&chain_id)
			.ok_or_else(|| missing("synchronizer"))?;
		let registrar = resolve_registrar(intent)?;

		Ok(Dependencies {
			account,
			chain_id,
			synchronizer: network.synchronizer_address,
			registrar,
		})
	}

	async fn fetch_signatures(
		&self,
		registrar: Address,
		action: TradeAction,
		chain_id: u64,
	) -> Result<SignaturePacket, TradeError> {
		tracing::info!(registrar = %registrar, action = %action, "Requesting oracle signatures");
		let response = self.oracle.get_signatures(registrar, action, chain_id).await;

		if !response.success {
			let reason = response
				.error
				.unwrap_or_else(|| "unknown error".to_string());
			return Err(TradeError::OracleSignature(reason));
		}

		match response.data {
			Some(packet) if !packet.signatures.is_empty() => Ok(packet),
			Some(_) => Err(TradeError::OracleSignature("no signatures returned".to_string())),
			None => Err(TradeError::OracleSignature("no signature data returned".to_string())),
		}
	}

	/// Registered transactions, newest first; all chains when `chain_id` is
	/// `None`.
	pub async fn history(&self, chain_id: Option<u64>) -> Result<Vec<TransactionRecord>, HistoryError> {
		match chain_id {
			Some(chain_id) => self.history.list_for_chain(chain_id).await,
			None => {
				let mut records = self.history.list().await?;
				records.reverse();
				Ok(records)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::calldata::ISynchronizer;
	use crate::classify::ErrorClassifier;
	use crate::executor::tests::ScriptedDelivery;
	use crate::executor::DEFAULT_GAS_MARGIN_BPS;
	use crate::partner::StaticPartnerId;
	use rust_decimal::Decimal;
	use std::collections::HashMap;
	use synth_account::implementations::local::LocalAccount;
	use synth_delivery::{DeliveryInterface, DeliveryService};
	use synth_history::implementations::memory::MemoryHistory;
	use synth_oracle::implementations::mock::{MockOracle, MockOracleConfig};
	use synth_oracle::OracleInterface;
	use alloy_sol_types::SolCall;
	use synth_types::{
		Currency, CurrencyAmount, NetworkConfig, SecretString, Token, TokenConfig, TradeAction,
		TradeType, U256,
	};

	const CHAIN_ID: u64 = 56;
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn dei() -> Currency {
		Currency::Token(Token {
			chain_id: CHAIN_ID,
			address: Address::repeat_byte(0xde),
			symbol: "DEI".to_string(),
			decimals: 18,
			name: None,
		})
	}

	fn sym() -> Currency {
		Currency::Token(Token {
			chain_id: CHAIN_ID,
			address: Address::repeat_byte(0x5e),
			symbol: "SYM".to_string(),
			decimals: 18,
			name: None,
		})
	}

	fn networks() -> NetworksConfig {
		let mut networks = HashMap::new();
		networks.insert(
			CHAIN_ID,
			NetworkConfig {
				rpc_url: "http://localhost:8545".to_string(),
				synchronizer_address: Address::repeat_byte(0x7a),
				native: None,
				tokens: vec![TokenConfig {
					address: Address::repeat_byte(0x5e),
					symbol: "SYM".to_string(),
					decimals: 18,
					name: None,
					fee: Some(Decimal::new(3, 3)),
				}],
			},
		);
		networks
	}

	fn open_intent() -> TradeIntent {
		TradeIntent {
			currency_in: Some(dei()),
			currency_out: Some(sym()),
			amount_in: Some(CurrencyAmount::parse(dei(), "100").unwrap()),
			amount_out: Some(CurrencyAmount::parse(sym(), "81.30081300813").unwrap()),
			trade_type: TradeType::Open,
		}
	}

	fn price_oracle() -> Arc<MockOracle> {
		Arc::new(MockOracle::new(MockOracleConfig {
			price: Decimal::new(123, 2),
			timestamp: Some(1_700_000_000),
			..Default::default()
		}))
	}

	struct Harness {
		engine: TradeEngine,
		oracle: Arc<MockOracle>,
		delivery: Arc<ScriptedDelivery>,
		account: Address,
	}

	async fn harness(oracle: Arc<MockOracle>, delivery: ScriptedDelivery) -> Harness {
		let delivery = Arc::new(delivery);
		let mut providers: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		providers.insert(CHAIN_ID, delivery.clone());

		let mut oracles: HashMap<String, Arc<dyn OracleInterface>> = HashMap::new();
		oracles.insert("mock".to_string(), oracle.clone());

		let account = Arc::new(AccountService::new(Box::new(
			LocalAccount::new(&SecretString::from(DEV_KEY)).unwrap(),
		)));
		let address = account.get_address().await.unwrap();
		let history = Arc::new(HistoryService::new(Box::new(MemoryHistory::new())));

		let executor = SubmissionExecutor::new(
			Arc::new(DeliveryService::new(providers)),
			history.clone(),
			ErrorClassifier::default(),
			DEFAULT_GAS_MARGIN_BPS,
		);
		let engine = TradeEngine::new(
			networks(),
			Some(CHAIN_ID),
			account,
			Arc::new(OracleService::new(oracles, "mock".to_string()).unwrap()),
			history,
			Arc::new(StaticPartnerId::new(Some(Address::repeat_byte(0xaa)))),
			executor,
		);

		Harness {
			engine,
			oracle,
			delivery,
			account: address,
		}
	}

	#[tokio::test]
	async fn test_end_to_end_open_trade() {
		let h = harness(
			price_oracle(),
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x0a, 0xbc])),
		)
		.await;
		let session = h.engine.default_session().await.unwrap();
		assert_eq!(session, TradeSession::new(CHAIN_ID, h.account));

		let hash = h.engine.execute(&open_intent(), &session).await.unwrap();

		assert_eq!(hash.to_string(), "0x0abc");
		assert_eq!(h.oracle.request_count(), 1);
		assert_eq!(
			h.oracle.last_request(),
			Some((Address::repeat_byte(0x5e), TradeAction::Buy, CHAIN_ID))
		);

		let sent = h.delivery.sent.lock().unwrap().clone();
		assert_eq!(sent.len(), 1);
		assert_eq!(&sent[0].data[..4], ISynchronizer::buyForCall::SELECTOR.as_slice());
		assert_eq!(sent[0].to, Address::repeat_byte(0x7a));
		assert_eq!(sent[0].from, h.account);
		assert_eq!(sent[0].gas_limit, Some(180_000));
		// partnerId, user, registrar, amountIn, price
		let data = &sent[0].data;
		assert_eq!(&data[4 + 12..36], Address::repeat_byte(0xaa).as_slice());
		assert_eq!(&data[36 + 12..68], h.account.as_slice());
		assert_eq!(&data[68 + 12..100], Address::repeat_byte(0x5e).as_slice());
		assert_eq!(
			U256::from_be_slice(&data[100..132]),
			U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64))
		);
		assert_eq!(
			U256::from_be_slice(&data[132..164]),
			U256::from(1_230_000_000_000_000_000u64)
		);

		let records = h.engine.history(Some(CHAIN_ID)).await.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].hash, "0x0abc");
		assert_eq!(records[0].summary, "Trade 100 DEI for 81.3008 SYM");
	}

	#[tokio::test]
	async fn test_end_to_end_close_trade() {
		let h = harness(
			price_oracle(),
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x0c, 0x10])),
		)
		.await;
		let session = TradeSession::new(CHAIN_ID, h.account);
		let intent = TradeIntent {
			currency_in: Some(sym()),
			currency_out: Some(dei()),
			amount_in: Some(CurrencyAmount::parse(sym(), "10").unwrap()),
			amount_out: Some(CurrencyAmount::parse(dei(), "12.3").unwrap()),
			trade_type: TradeType::Close,
		};

		let hash = h.engine.execute(&intent, &session).await.unwrap();

		assert_eq!(hash.to_string(), "0x0c10");
		// registrar comes from the input side on close
		assert_eq!(
			h.oracle.last_request(),
			Some((Address::repeat_byte(0x5e), TradeAction::Sell, CHAIN_ID))
		);

		let sent = h.delivery.sent.lock().unwrap().clone();
		assert_eq!(sent.len(), 1);
		let data = &sent[0].data;
		assert_eq!(&data[..4], ISynchronizer::sellForCall::SELECTOR.as_slice());
		assert_eq!(&data[68 + 12..100], Address::repeat_byte(0x5e).as_slice());
		assert_eq!(
			U256::from_be_slice(&data[100..132]),
			U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64))
		);
	}

	#[tokio::test]
	async fn test_missing_currency_makes_no_oracle_request() {
		let h = harness(
			price_oracle(),
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x01])),
		)
		.await;
		let session = TradeSession::new(CHAIN_ID, h.account);
		let intent = TradeIntent {
			currency_out: None,
			..open_intent()
		};

		let err = h.engine.execute(&intent, &session).await.unwrap_err();

		assert_eq!(err, TradeError::MissingDependency("output currency".to_string()));
		assert_eq!(h.oracle.request_count(), 0);
		assert!(h.delivery.calls().is_empty());
	}

	#[tokio::test]
	async fn test_oracle_failure_stops_before_submission() {
		let h = harness(
			Arc::new(MockOracle::failing("nodes unreachable")),
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x01])),
		)
		.await;
		let session = TradeSession::new(CHAIN_ID, h.account);

		let err = h.engine.execute(&open_intent(), &session).await.unwrap_err();

		assert_eq!(err.to_string(), "Unable to fetch Muon signatures: nodes unreachable");
		assert!(h.delivery.calls().is_empty());
	}

	#[tokio::test]
	async fn test_empty_signature_list_is_rejected() {
		let oracle = Arc::new(MockOracle::new(MockOracleConfig {
			signers: vec![],
			..Default::default()
		}));
		let h = harness(
			oracle,
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x01])),
		)
		.await;
		let session = TradeSession::new(CHAIN_ID, h.account);

		let err = h.engine.execute(&open_intent(), &session).await.unwrap_err();

		assert!(matches!(err, TradeError::OracleSignature(_)));
		assert!(h.delivery.calls().is_empty());
	}

	#[tokio::test]
	async fn test_callback_state() {
		let h = harness(
			price_oracle(),
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x01])),
		)
		.await;
		let session = TradeSession::new(CHAIN_ID, h.account);
		let engine = &h.engine;

		assert_eq!(
			engine.callback_state(&open_intent(), &session),
			TradeCallbackState::Valid
		);
		assert_eq!(
			engine.callback_state(&open_intent(), &TradeSession::default()),
			TradeCallbackState::Invalid("Missing dependencies".to_string())
		);
		assert_eq!(
			engine.callback_state(&open_intent(), &TradeSession::new(1, h.account)),
			TradeCallbackState::Invalid("Missing dependencies".to_string())
		);

		let zero = TradeIntent {
			amount_in: Some(CurrencyAmount::parse(dei(), "0").unwrap()),
			..open_intent()
		};
		assert_eq!(
			engine.callback_state(&zero, &session),
			TradeCallbackState::Invalid("No amount provided".to_string())
		);
		let err = engine.execute(&zero, &session).await.unwrap_err();
		assert_eq!(err, TradeError::MissingDependency("amount in".to_string()));
		assert_eq!(h.oracle.request_count(), 0);
	}

	#[tokio::test]
	async fn test_quote_uses_configured_asset_fee() {
		let h = harness(
			price_oracle(),
			ScriptedDelivery::succeeding(150_000, TransactionHash(vec![0x01])),
		)
		.await;
		let session = TradeSession::new(CHAIN_ID, h.account);

		let quote = h.engine.quote(&open_intent(), &session);

		assert_eq!(quote.fee_label, "0.3% / 0.3 DEI");
		assert_eq!(quote.summary, "Trade 100 DEI for 81.3008 SYM");
	}
}
