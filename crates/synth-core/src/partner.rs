//! Partner identifier lookup.
//!
//! Trades are attributed to a registered partner on-chain. Front-ends that
//! serve several partners can supply their own provider.

use synth_types::Address;

pub trait PartnerIdProvider: Send + Sync {
	/// Partner id to use on `chain_id`, if one is registered.
	fn partner_id(&self, chain_id: u64) -> Option<Address>;
}

/// The same configured partner id on every chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPartnerId(Option<Address>);

impl StaticPartnerId {
	pub fn new(partner_id: Option<Address>) -> Self {
		Self(partner_id)
	}
}

impl PartnerIdProvider for StaticPartnerId {
	fn partner_id(&self, _chain_id: u64) -> Option<Address> {
		self.0
	}
}
