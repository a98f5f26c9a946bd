//! Multi-sig composition.
//!
//! Every authorised co-signer signs an envelope naming the multi-sig account
//! and the outer signer alongside the inner action. The outer signer collects
//! the signatures into a `multiSig` action and signs that once more with
//! `SendMultiSig`. Threshold and membership checks happen on the exchange.

use signer_encoding::{action_hash, ActionHash};
use signer_types::{
	lowercase_address, primary_type, ActionMap, ActionValue, Chain, Signature, TypedDataField,
	TypedDataTypes,
};
use signer_wallet::{AbstractWallet, WalletObject};

use crate::exchange::{sign_l1_action, L1ActionRequest};
use crate::user_signed::{sign_user_signed_action, UserSignedKind};
use crate::SigningError;

pub const MULTI_SIG_ACTION_TYPE: &str = "multiSig";
pub const PAYLOAD_MULTI_SIG_USER: &str = "payloadMultiSigUser";
pub const OUTER_SIGNER: &str = "outerSigner";
const HYPERLIQUID_CHAIN: &str = "hyperliquidChain";

/// `[multiSigUser, outerSigner, action]` with both addresses lowercased.
pub fn l1_envelope(multi_sig_user: &str, outer_signer: &str, action: &ActionValue) -> ActionValue {
	ActionValue::Array(vec![
		ActionValue::Str(lowercase_address(multi_sig_user)),
		ActionValue::Str(lowercase_address(outer_signer)),
		action.clone(),
	])
}

/// One co-signer's signature over an L1 action on behalf of `multi_sig_user`.
///
/// `request` carries the inner action; nonce, vault, expiry and chain are
/// signed as given.
pub async fn sign_l1_multi_sig_part(
	wallet: &dyn WalletObject,
	request: &L1ActionRequest,
	multi_sig_user: &str,
	outer_signer: &str,
) -> Result<Signature, SigningError> {
	let envelope = L1ActionRequest {
		action: l1_envelope(multi_sig_user, outer_signer, &request.action),
		nonce: request.nonce,
		vault_address: request.vault_address.clone(),
		expires_after: request.expires_after,
		chain: request.chain,
	};
	sign_l1_action(wallet, &envelope).await
}

/// Adds `payloadMultiSigUser` and `outerSigner` right after
/// `hyperliquidChain`, in both the action and its primary type.
pub fn user_signed_envelope(
	action: &ActionValue,
	types: &TypedDataTypes,
	multi_sig_user: &str,
	outer_signer: &str,
) -> Result<(ActionValue, TypedDataTypes), SigningError> {
	let primary = primary_type(types)
		.ok_or_else(|| SigningError::InvalidAction("type map is empty".into()))?
		.to_string();

	let mut types = types.clone();
	let fields = types
		.get_mut(&primary)
		.ok_or_else(|| SigningError::InvalidAction(format!("unknown primary type {}", primary)))?;
	let position = fields
		.iter()
		.position(|field| field.name == HYPERLIQUID_CHAIN)
		.ok_or_else(|| {
			SigningError::InvalidAction(format!("{} is missing from {}", HYPERLIQUID_CHAIN, primary))
		})?;
	fields.insert(position + 1, TypedDataField::new(PAYLOAD_MULTI_SIG_USER, "address"));
	fields.insert(position + 2, TypedDataField::new(OUTER_SIGNER, "address"));

	let mut map = action
		.as_map()
		.cloned()
		.ok_or_else(|| SigningError::InvalidAction(format!("expected a map, got {}", action.kind())))?;
	let index = map
		.get_index_of(HYPERLIQUID_CHAIN)
		.map_or(map.len(), |i| i + 1);
	map.shift_insert(
		index,
		PAYLOAD_MULTI_SIG_USER.to_string(),
		ActionValue::Str(lowercase_address(multi_sig_user)),
	);
	map.shift_insert(
		index + 1,
		OUTER_SIGNER.to_string(),
		ActionValue::Str(lowercase_address(outer_signer)),
	);

	Ok((ActionValue::Map(map), types))
}

/// One co-signer's signature over a user-signed action on behalf of
/// `multi_sig_user`.
pub async fn sign_user_signed_multi_sig_part(
	wallet: &dyn WalletObject,
	action: &ActionValue,
	types: &TypedDataTypes,
	chain_id: u64,
	multi_sig_user: &str,
	outer_signer: &str,
) -> Result<Signature, SigningError> {
	let (envelope, types) = user_signed_envelope(action, types, multi_sig_user, outer_signer)?;
	sign_user_signed_action(wallet, &envelope, &types, chain_id).await
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSigPayload {
	pub multi_sig_user: String,
	pub outer_signer: String,
	pub action: ActionValue,
}

/// The `multiSig` action the outer signer submits.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSigAction {
	pub signature_chain_id: u64,
	pub signatures: Vec<Signature>,
	pub payload: MultiSigPayload,
}

impl MultiSigAction {
	pub fn new(
		signature_chain_id: u64,
		multi_sig_user: &str,
		outer_signer: &str,
		action: ActionValue,
		signatures: Vec<Signature>,
	) -> Self {
		Self {
			signature_chain_id,
			signatures,
			payload: MultiSigPayload {
				multi_sig_user: lowercase_address(multi_sig_user),
				outer_signer: lowercase_address(outer_signer),
				action,
			},
		}
	}

	/// The action's fields without its `type` tag.
	fn untagged(&self) -> ActionMap {
		let signatures = self
			.signatures
			.iter()
			.map(|sig| {
				ActionValue::map([
					("r", ActionValue::Str(sig.r.to_string())),
					("s", ActionValue::Str(sig.s.to_string())),
					("v", ActionValue::Int(sig.v.into())),
				])
			})
			.collect();
		let payload = ActionValue::map([
			("multiSigUser", ActionValue::Str(self.payload.multi_sig_user.clone())),
			("outerSigner", ActionValue::Str(self.payload.outer_signer.clone())),
			("action", self.payload.action.clone()),
		]);

		let mut map = ActionMap::new();
		map.insert(
			"signatureChainId".to_string(),
			ActionValue::Str(format!("{:#x}", self.signature_chain_id)),
		);
		map.insert("signatures".to_string(), ActionValue::Array(signatures));
		map.insert("payload".to_string(), payload);
		map
	}

	/// Hash the outer signer commits to: the untagged action with the usual
	/// nonce, vault and expiry suffix.
	pub fn hash(
		&self,
		nonce: u64,
		vault_address: Option<&str>,
		expires_after: Option<u64>,
	) -> Result<ActionHash, SigningError> {
		Ok(action_hash(
			&ActionValue::Map(self.untagged()),
			nonce,
			vault_address,
			expires_after,
		)?)
	}
}

impl From<&MultiSigAction> for ActionValue {
	fn from(action: &MultiSigAction) -> Self {
		let mut map = ActionMap::new();
		map.insert("type".to_string(), ActionValue::from(MULTI_SIG_ACTION_TYPE));
		map.extend(action.untagged());
		ActionValue::Map(map)
	}
}

/// The outer signer's signature over a collected `multiSig` action.
pub async fn sign_multi_sig_action(
	wallet: &dyn WalletObject,
	action: &MultiSigAction,
	nonce: u64,
	vault_address: Option<&str>,
	expires_after: Option<u64>,
	chain: Chain,
) -> Result<Signature, SigningError> {
	AbstractWallet::new(wallet)?;
	let hash = action.hash(nonce, vault_address, expires_after)?;

	tracing::info!(
		signatures = action.signatures.len(),
		multi_sig_user = %action.payload.multi_sig_user,
		nonce,
		"Signing multi-sig action"
	);

	let envelope = ActionValue::map([
		("hyperliquidChain", ActionValue::from(chain.hyperliquid_chain())),
		("multiSigActionHash", ActionValue::Str(hash.to_string())),
		("nonce", ActionValue::from(nonce)),
	]);
	sign_user_signed_action(
		wallet,
		&envelope,
		&UserSignedKind::SendMultiSig.types(),
		action.signature_chain_id,
	)
	.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use signer_types::{SecretString, TESTNET_SIGNATURE_CHAIN_ID};
	use signer_wallet::implementations::local::LocalWallet;

	const K1: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";
	const K2: &str = "0xe908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";
	const K3: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const MULTI_SIG_USER: &str = "0xABABABABABABABABABABABABABABABABABABABAB";
	const OUTER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
	const NONCE: u64 = 1_234_567_890;

	fn wallet(key: &str) -> LocalWallet {
		LocalWallet::new(&SecretString::from(key)).unwrap()
	}

	fn cancel() -> ActionValue {
		ActionValue::from(json!({"type": "cancel", "cancels": [{"a": 0, "o": 12345}]}))
	}

	#[test]
	fn test_l1_envelope_lowercases_addresses() {
		let envelope = l1_envelope(MULTI_SIG_USER, OUTER, &cancel());
		let request = L1ActionRequest::new(envelope.clone(), NONCE);
		assert_eq!(
			request.hash().unwrap().to_string(),
			"0xc181eb8a6cc77377bf158eef9fa7fa4a843afe44b2ea6039f65c227759fc6d8d"
		);
		match envelope {
			ActionValue::Array(items) => {
				assert_eq!(items[0], ActionValue::from("0xabababababababababababababababababababab"));
				assert_eq!(items[1], ActionValue::from("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
			},
			other => panic!("unexpected envelope {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_two_signers_then_outer_signer() {
		let request = L1ActionRequest::new(cancel(), NONCE);
		let mut signatures = Vec::new();
		for key in [K1, K2] {
			let signature = sign_l1_multi_sig_part(&wallet(key), &request, MULTI_SIG_USER, OUTER)
				.await
				.unwrap();
			signatures.push(signature);
		}
		assert_eq!(
			signatures[0].to_string(),
			"0x9bbfaa1283dcaf8e918ebb4d1978f5495ca4413cb0b9a9f4e3dc660dd570e2f31c6e8af4d8ad29c05b27bed5be8aca3a8e56077c7031501cd9df74b7adeef65f1b"
		);
		assert_eq!(
			signatures[1].to_string(),
			"0x3be8af50dbe2217713b2afef59bdf4ef888693567246a8bd712539810c6831365c0c88d22a988091c41bb7327251268e0d8b252595d3d77462120880223ae4cd1c"
		);

		let action = MultiSigAction::new(
			TESTNET_SIGNATURE_CHAIN_ID,
			MULTI_SIG_USER,
			OUTER,
			cancel(),
			signatures,
		);
		assert_eq!(
			action.hash(NONCE, None, None).unwrap().to_string(),
			"0x47fdafd0fcc5d6ad453b181c95ca2482d65d1a106c489778341c505a278af172"
		);

		let outer = wallet(K3);
		let signature = sign_multi_sig_action(&outer, &action, NONCE, None, None, Chain::Mainnet)
			.await
			.unwrap();
		assert_eq!(
			signature.to_string(),
			"0xbef9f708886dabb0f94269260a2a3bd6133a29848218c9fcec95db98db25506621817c4b3452895814ef13159db5a9bfc6188f392087b2a45687bc85bcaf9ab91c"
		);
	}

	#[test]
	fn test_multi_sig_action_value() {
		let signature = Signature::split("0x9bbfaa1283dcaf8e918ebb4d1978f5495ca4413cb0b9a9f4e3dc660dd570e2f31c6e8af4d8ad29c05b27bed5be8aca3a8e56077c7031501cd9df74b7adeef65f1b").unwrap();
		let action = MultiSigAction::new(0x66eee, MULTI_SIG_USER, OUTER, cancel(), vec![signature]);
		assert_eq!(
			ActionValue::from(&action).to_json(),
			json!({
				"type": "multiSig",
				"signatureChainId": "0x66eee",
				"signatures": [{
					"r": "0x9bbfaa1283dcaf8e918ebb4d1978f5495ca4413cb0b9a9f4e3dc660dd570e2f3",
					"s": "0x1c6e8af4d8ad29c05b27bed5be8aca3a8e56077c7031501cd9df74b7adeef65f",
					"v": 27
				}],
				"payload": {
					"multiSigUser": "0xabababababababababababababababababababab",
					"outerSigner": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
					"action": {"type": "cancel", "cancels": [{"a": 0, "o": 12345}]}
				}
			})
		);
	}

	fn usd_send() -> ActionValue {
		ActionValue::from(json!({
			"type": "usdSend",
			"signatureChainId": "0x66eee",
			"hyperliquidChain": "Mainnet",
			"destination": "0x0d1d9635d0640821d15e323ac8adadfa9c111414",
			"amount": "1",
			"time": 1690393044548u64
		}))
	}

	#[test]
	fn test_user_signed_envelope_inserts_after_chain() {
		let (envelope, types) = user_signed_envelope(
			&usd_send(),
			&UserSignedKind::UsdSend.types(),
			MULTI_SIG_USER,
			OUTER,
		)
		.unwrap();

		let fields: Vec<&str> = types["HyperliquidTransaction:UsdSend"]
			.iter()
			.map(|field| field.name.as_str())
			.collect();
		assert_eq!(
			fields,
			vec!["hyperliquidChain", "payloadMultiSigUser", "outerSigner", "destination", "amount", "time"]
		);
		let keys: Vec<&str> = envelope.as_map().unwrap().keys().map(String::as_str).collect();
		assert_eq!(&keys[2..5], &["hyperliquidChain", "payloadMultiSigUser", "outerSigner"]);
	}

	#[test]
	fn test_user_signed_envelope_requires_chain_field() {
		let types = signer_types::single_type("X", &[("amount", "string")]);
		assert!(matches!(
			user_signed_envelope(&usd_send(), &types, MULTI_SIG_USER, OUTER),
			Err(SigningError::InvalidAction(_))
		));
	}

	#[tokio::test]
	async fn test_user_signed_part_golden() {
		let signature = sign_user_signed_multi_sig_part(
			&wallet(K1),
			&usd_send(),
			&UserSignedKind::UsdSend.types(),
			0x66eee,
			MULTI_SIG_USER,
			OUTER,
		)
		.await
		.unwrap();
		assert_eq!(
			signature.to_string(),
			"0xc8d0364510f85d0a71ed73c192b273a0709f65c9f269cb221817db14518355a56fcc7fc66337ffdd04b0184aeed0d4f06e202c4347342ea07c3ff896a8ed49911c"
		);
	}
}
