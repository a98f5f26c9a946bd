//! L1 action signing.
//!
//! The wallet never sees the action itself. It signs an `Agent` message whose
//! `connectionId` is the action hash, under a fixed domain shared by mainnet
//! and testnet; `source` tells the two apart.

use serde_json::{json, Value};
use signer_encoding::{action_hash, ActionHash};
use signer_types::{
	single_type, truncate_id, ActionValue, Address, Chain, Signature, TypedDataDomain,
	TypedDataTypes,
};
use signer_wallet::{AbstractWallet, WalletObject};

use crate::SigningError;

pub const L1_DOMAIN_NAME: &str = "Exchange";
pub const L1_DOMAIN_VERSION: &str = "1";
pub const L1_CHAIN_ID: u64 = 1337;
pub const AGENT_TYPE: &str = "Agent";

/// `{name: "Exchange", version: "1", chainId: 1337, verifyingContract: 0x0}`
pub fn l1_domain() -> TypedDataDomain {
	TypedDataDomain {
		name: L1_DOMAIN_NAME.to_string(),
		version: L1_DOMAIN_VERSION.to_string(),
		chain_id: L1_CHAIN_ID,
		verifying_contract: Address::ZERO,
	}
}

/// `Agent(string source, bytes32 connectionId)`
pub fn agent_types() -> TypedDataTypes {
	single_type(AGENT_TYPE, &[("source", "string"), ("connectionId", "bytes32")])
}

pub fn agent_message(chain: Chain, connection_id: &ActionHash) -> Value {
	json!({
		"source": chain.source(),
		"connectionId": connection_id.to_string(),
	})
}

/// An action together with the context its hash commits to.
#[derive(Debug, Clone, PartialEq)]
pub struct L1ActionRequest {
	pub action: ActionValue,
	pub nonce: u64,
	pub vault_address: Option<String>,
	pub expires_after: Option<u64>,
	pub chain: Chain,
}

impl L1ActionRequest {
	/// A mainnet request without vault or expiry.
	pub fn new(action: impl Into<ActionValue>, nonce: u64) -> Self {
		Self {
			action: action.into(),
			nonce,
			vault_address: None,
			expires_after: None,
			chain: Chain::Mainnet,
		}
	}

	pub fn with_vault_address(mut self, vault_address: impl Into<String>) -> Self {
		self.vault_address = Some(vault_address.into());
		self
	}

	pub fn with_expires_after(mut self, expires_after: u64) -> Self {
		self.expires_after = Some(expires_after);
		self
	}

	pub fn with_chain(mut self, chain: Chain) -> Self {
		self.chain = chain;
		self
	}

	/// Hash of the action, nonce, vault and expiry.
	pub fn hash(&self) -> Result<ActionHash, SigningError> {
		Ok(action_hash(
			&self.action,
			self.nonce,
			self.vault_address.as_deref(),
			self.expires_after,
		)?)
	}
}

/// Signs an L1 action.
///
/// The wallet is detected before anything is hashed, so an unsupported wallet
/// fails without further work.
pub async fn sign_l1_action(
	wallet: &dyn WalletObject,
	request: &L1ActionRequest,
) -> Result<Signature, SigningError> {
	let wallet = AbstractWallet::new(wallet)?;
	let connection_id = request.hash()?;

	tracing::info!(
		nonce = request.nonce,
		chain = %request.chain,
		connection_id = %truncate_id(&connection_id.to_string()),
		vault = request.vault_address.is_some(),
		"Signing L1 action"
	);

	let raw = wallet
		.sign_typed_data(
			&l1_domain(),
			&agent_types(),
			&agent_message(request.chain, &connection_id),
		)
		.await?;
	Ok(Signature::split(&raw)?)
}
