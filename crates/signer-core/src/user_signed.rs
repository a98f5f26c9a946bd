//! User-signed action signing.
//!
//! Transfers, withdrawals and approvals are signed directly as EIP-712
//! messages: the action object is the message, described by a caller-supplied
//! type map whose first key is the primary type.

use serde_json::Value;
use signer_types::{
	primary_type, single_type, ActionMap, ActionValue, Address, Chain, Signature,
	TypedDataDomain, TypedDataTypes,
};
use signer_wallet::{AbstractWallet, WalletObject};
use std::fmt;
use std::str::FromStr;

use crate::SigningError;

pub const USER_SIGNED_DOMAIN_NAME: &str = "HyperliquidSignTransaction";
pub const USER_SIGNED_DOMAIN_VERSION: &str = "1";

/// `{name: "HyperliquidSignTransaction", version: "1", chainId, verifyingContract: 0x0}`
pub fn user_signed_domain(chain_id: u64) -> TypedDataDomain {
	TypedDataDomain {
		name: USER_SIGNED_DOMAIN_NAME.to_string(),
		version: USER_SIGNED_DOMAIN_VERSION.to_string(),
		chain_id,
		verifying_contract: Address::ZERO,
	}
}

/// User-signed actions with a known type layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSignedKind {
	UsdSend,
	Withdraw,
	SpotSend,
	ApproveAgent,
	ApproveBuilderFee,
	SendMultiSig,
}

impl UserSignedKind {
	pub const ALL: [UserSignedKind; 6] = [
		UserSignedKind::UsdSend,
		UserSignedKind::Withdraw,
		UserSignedKind::SpotSend,
		UserSignedKind::ApproveAgent,
		UserSignedKind::ApproveBuilderFee,
		UserSignedKind::SendMultiSig,
	];

	/// Value of the action's `type` key.
	pub fn action_type(&self) -> &'static str {
		match self {
			UserSignedKind::UsdSend => "usdSend",
			UserSignedKind::Withdraw => "withdraw3",
			UserSignedKind::SpotSend => "spotSend",
			UserSignedKind::ApproveAgent => "approveAgent",
			UserSignedKind::ApproveBuilderFee => "approveBuilderFee",
			UserSignedKind::SendMultiSig => "sendMultiSig",
		}
	}

	/// EIP-712 primary type name.
	pub fn primary_type(&self) -> &'static str {
		match self {
			UserSignedKind::UsdSend => "HyperliquidTransaction:UsdSend",
			UserSignedKind::Withdraw => "HyperliquidTransaction:Withdraw",
			UserSignedKind::SpotSend => "HyperliquidTransaction:SpotSend",
			UserSignedKind::ApproveAgent => "HyperliquidTransaction:ApproveAgent",
			UserSignedKind::ApproveBuilderFee => "HyperliquidTransaction:ApproveBuilderFee",
			UserSignedKind::SendMultiSig => "HyperliquidTransaction:SendMultiSig",
		}
	}

	pub fn fields(&self) -> &'static [(&'static str, &'static str)] {
		match self {
			UserSignedKind::UsdSend | UserSignedKind::Withdraw => &[
				("hyperliquidChain", "string"),
				("destination", "string"),
				("amount", "string"),
				("time", "uint64"),
			],
			UserSignedKind::SpotSend => &[
				("hyperliquidChain", "string"),
				("destination", "string"),
				("token", "string"),
				("amount", "string"),
				("time", "uint64"),
			],
			UserSignedKind::ApproveAgent => &[
				("hyperliquidChain", "string"),
				("agentAddress", "address"),
				("agentName", "string"),
				("nonce", "uint64"),
			],
			UserSignedKind::ApproveBuilderFee => &[
				("hyperliquidChain", "string"),
				("maxFeeRate", "string"),
				("builder", "address"),
				("nonce", "uint64"),
			],
			UserSignedKind::SendMultiSig => &[
				("hyperliquidChain", "string"),
				("multiSigActionHash", "bytes32"),
				("nonce", "uint64"),
			],
		}
	}

	pub fn types(&self) -> TypedDataTypes {
		single_type(self.primary_type(), self.fields())
	}

	/// Looks up the layout for an action by its `type` key.
	pub fn from_action(action: &ActionValue) -> Option<Self> {
		action
			.get("type")
			.and_then(ActionValue::as_str)
			.and_then(|ty| ty.parse().ok())
	}
}

impl fmt::Display for UserSignedKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.action_type())
	}
}

impl FromStr for UserSignedKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.action_type() == s)
			.ok_or_else(|| format!("Unknown user-signed action type '{}'", s))
	}
}

/// Reads `signatureChainId` from an action, as a hex string or an integer.
pub fn signature_chain_id(action: &ActionValue) -> Result<u64, SigningError> {
	let missing = || SigningError::InvalidAction("signatureChainId is missing".into());
	match action.get("signatureChainId").ok_or_else(missing)? {
		ActionValue::Int(id) => u64::try_from(*id)
			.map_err(|_| SigningError::InvalidAction(format!("negative signatureChainId {}", id))),
		ActionValue::Str(id) => {
			let parsed = match id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
				Some(hex) => u64::from_str_radix(hex, 16),
				None => id.parse(),
			};
			parsed.map_err(|e| {
				SigningError::InvalidAction(format!("invalid signatureChainId '{}': {}", id, e))
			})
		},
		other => Err(SigningError::InvalidAction(format!(
			"signatureChainId must be a string or integer, got {}",
			other.kind()
		))),
	}
}

/// Sets `signatureChainId` (as `0x` hex) and `hyperliquidChain` on an action.
pub fn with_chain_fields(action: &mut ActionMap, chain: Chain, signature_chain_id: u64) {
	action.insert(
		"signatureChainId".to_string(),
		ActionValue::Str(format!("{:#x}", signature_chain_id)),
	);
	action.insert(
		"hyperliquidChain".to_string(),
		ActionValue::from(chain.hyperliquid_chain()),
	);
}

/// Projects `action` onto the fields of the primary type, in type order.
///
/// Keys the type does not declare (`type`, `signatureChainId`) are left out.
/// A declared field missing from the action, or holding a NaN or infinite
/// number, is an error.
pub fn user_signed_message(
	action: &ActionValue,
	types: &TypedDataTypes,
) -> Result<Value, SigningError> {
	let primary = primary_type(types)
		.ok_or_else(|| SigningError::InvalidAction("type map is empty".into()))?;
	let map = action
		.as_map()
		.ok_or_else(|| SigningError::InvalidAction(format!("expected a map, got {}", action.kind())))?;

	let mut message = serde_json::Map::new();
	for field in &types[primary] {
		let value = map.get(&field.name).ok_or_else(|| {
			SigningError::InvalidAction(format!("missing field '{}' of {}", field.name, primary))
		})?;
		if let Some(number) = non_finite(value) {
			return Err(SigningError::InvalidAction(format!(
				"field '{}' of {} holds non-finite number {}",
				field.name, primary, number
			)));
		}
		message.insert(field.name.clone(), value.to_json());
	}
	Ok(Value::Object(message))
}

fn non_finite(value: &ActionValue) -> Option<f64> {
	match value {
		ActionValue::Float(number) if !number.is_finite() => Some(*number),
		ActionValue::Array(items) => items.iter().find_map(non_finite),
		ActionValue::Map(map) => map.values().find_map(non_finite),
		_ => None,
	}
}

/// Signs a user-signed action under the `HyperliquidSignTransaction` domain.
pub async fn sign_user_signed_action(
	wallet: &dyn WalletObject,
	action: &ActionValue,
	types: &TypedDataTypes,
	chain_id: u64,
) -> Result<Signature, SigningError> {
	let wallet = AbstractWallet::new(wallet)?;
	let message = user_signed_message(action, types)?;

	tracing::info!(
		chain_id,
		primary_type = ?primary_type(types),
		"Signing user-signed action"
	);

	let raw = wallet
		.sign_typed_data(&user_signed_domain(chain_id), types, &message)
		.await?;
	Ok(Signature::split(&raw)?)
}
