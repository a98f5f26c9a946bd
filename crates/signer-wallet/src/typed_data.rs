//! EIP-712 signing across the five wallet calling conventions.
//!
//! Each [`WalletKind`] maps to one [`CallPath`] entry: the method to invoke,
//! how arguments are laid out, and whether the synthetic `EIP712Domain` type
//! is placed in front of the caller's types. viem and EIP-1193 providers want
//! it; ethers derives the domain type itself and must not receive it.

use serde::Serialize;
use serde_json::{json, Value};
use signer_types::{
	primary_type, with_domain_type, TypedDataDomain, TypedDataPayload, TypedDataTypes,
	EIP712_DOMAIN_TYPE,
};

use crate::detect::{AbstractWallet, WalletKind, REQUEST, SIGN_TYPED_DATA, SIGN_TYPED_DATA_V5};
use crate::{WalletError, WalletMethod, WalletObject};

/// EIP-1193 method returning the provider's accounts.
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
/// EIP-1193 method signing a JSON-encoded typed-data object.
pub const ETH_SIGN_TYPED_DATA_V4: &str = "eth_signTypedData_v4";

/// How the signing method expects its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
	/// One typed-data object.
	Object,
	/// One typed-data object followed by an options argument, sent as `null`.
	ObjectWithOptions,
	/// `(domain, types, message)`.
	Positional,
	/// Account request followed by `eth_signTypedData_v4`.
	Eip1193,
}

/// One entry of the call-path table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPath {
	pub method: &'static str,
	pub convention: CallingConvention,
	pub include_domain_type: bool,
}

static VIEM: CallPath = CallPath {
	method: SIGN_TYPED_DATA,
	convention: CallingConvention::Object,
	include_domain_type: true,
};
static EXTENDED_VIEM: CallPath = CallPath {
	method: SIGN_TYPED_DATA,
	convention: CallingConvention::ObjectWithOptions,
	include_domain_type: true,
};
static ETHERS: CallPath = CallPath {
	method: SIGN_TYPED_DATA,
	convention: CallingConvention::Positional,
	include_domain_type: false,
};
static ETHERS_V5: CallPath = CallPath {
	method: SIGN_TYPED_DATA_V5,
	convention: CallingConvention::Positional,
	include_domain_type: false,
};
static WINDOW_PROVIDER: CallPath = CallPath {
	method: REQUEST,
	convention: CallingConvention::Eip1193,
	include_domain_type: true,
};

impl WalletKind {
	pub fn call_path(self) -> &'static CallPath {
		match self {
			WalletKind::Viem => &VIEM,
			WalletKind::ExtendedViem => &EXTENDED_VIEM,
			WalletKind::Ethers => &ETHERS,
			WalletKind::EthersV5 => &ETHERS_V5,
			WalletKind::WindowProvider => &WINDOW_PROVIDER,
		}
	}
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, WalletError> {
	serde_json::to_value(value).map_err(|e| WalletError::InvalidTypedData(e.to_string()))
}

fn into_signature(value: Value) -> Result<String, WalletError> {
	match value {
		Value::String(signature) => Ok(signature),
		other => Err(WalletError::InvalidResponse(format!(
			"expected a hex signature string, got {}",
			other
		))),
	}
}

fn without_domain_type(types: &TypedDataTypes) -> TypedDataTypes {
	types
		.iter()
		.filter(|(name, _)| name.as_str() != EIP712_DOMAIN_TYPE)
		.map(|(name, fields)| (name.clone(), fields.clone()))
		.collect()
}

impl AbstractWallet<'_> {
	/// Signs `message` under `domain` and `types`, returning the wallet's hex
	/// signature. The primary type is the first key of `types`.
	pub async fn sign_typed_data(
		&self,
		domain: &TypedDataDomain,
		types: &TypedDataTypes,
		message: &Value,
	) -> Result<String, WalletError> {
		let primary = primary_type(types)
			.ok_or_else(|| WalletError::InvalidTypedData("type map is empty".into()))?
			.to_string();
		let path = self.kind.call_path();
		let method = self
			.object
			.method(path.method)
			.ok_or(WalletError::UnsupportedWallet)?;

		let types = if path.include_domain_type {
			with_domain_type(types)
		} else {
			without_domain_type(types)
		};

		tracing::debug!(
			kind = %self.kind,
			method = path.method,
			primary_type = %primary,
			"Requesting typed-data signature"
		);

		let args = match path.convention {
			CallingConvention::Object | CallingConvention::ObjectWithOptions => {
				let payload = to_json(&TypedDataPayload {
					domain: domain.clone(),
					types,
					primary_type: primary,
					message: message.clone(),
				})?;
				if path.convention == CallingConvention::ObjectWithOptions {
					vec![payload, Value::Null]
				} else {
					vec![payload]
				}
			},
			CallingConvention::Positional => vec![to_json(domain)?, to_json(&types)?, message.clone()],
			CallingConvention::Eip1193 => {
				let payload = TypedDataPayload {
					domain: domain.clone(),
					types,
					primary_type: primary,
					message: message.clone(),
				};
				return request_signature(method, &payload).await;
			},
		};

		let result = method.call(args).await.map_err(WalletError::Provider)?;
		into_signature(result)
	}
}

async fn request_signature(
	method: &dyn WalletMethod,
	payload: &TypedDataPayload,
) -> Result<String, WalletError> {
	let response = method
		.call(vec![json!({ "method": ETH_REQUEST_ACCOUNTS })])
		.await
		.map_err(WalletError::Provider)?;
	let accounts = response.as_array().ok_or_else(|| {
		WalletError::InvalidResponse(format!("expected an account list, got {}", response))
	})?;
	tracing::debug!(accounts = accounts.len(), "Provider returned accounts");

	let account = accounts
		.first()
		.ok_or(WalletError::NoAccounts)?
		.as_str()
		.ok_or_else(|| WalletError::InvalidResponse("account is not a string".into()))?;
	let body =
		serde_json::to_string(payload).map_err(|e| WalletError::InvalidTypedData(e.to_string()))?;

	let result = method
		.call(vec![json!({
			"method": ETH_SIGN_TYPED_DATA_V4,
			"params": [account, body],
		})])
		.await
		.map_err(WalletError::Provider)?;
	into_signature(result)
}

/// Detects `wallet`'s calling convention and signs through it.
///
/// Fails with [`WalletError::UnsupportedWallet`] before any wallet call when
/// the object matches no known shape.
pub async fn sign_typed_data(
	wallet: &dyn WalletObject,
	domain: &TypedDataDomain,
	types: &TypedDataTypes,
	message: &Value,
) -> Result<String, WalletError> {
	AbstractWallet::new(wallet)?
		.sign_typed_data(domain, types, message)
		.await
}
