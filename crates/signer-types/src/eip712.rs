//! EIP-712 typed-data building blocks shared across the signer.
//!
//! These types describe what a wallet is asked to sign:
//! - the domain (`name`, `version`, `chainId`, `verifyingContract`)
//! - the caller's type map, kept in insertion order because the first key is
//!   the primary type
//! - the full wallet payload (`{domain, types, primaryType, message}`)

use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the synthetic domain type some wallets expect inside `types`.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// EIP-712 domain as it appears in wallet payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
	pub verifying_contract: Address,
}

/// One `{name, type}` entry of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: String,
}

impl TypedDataField {
	pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
		}
	}
}

/// Struct type definitions keyed by type name, in insertion order.
pub type TypedDataTypes = IndexMap<String, Vec<TypedDataField>>;

/// Builds a single-struct type map.
pub fn single_type(primary: &str, fields: &[(&str, &str)]) -> TypedDataTypes {
	let mut types = TypedDataTypes::new();
	types.insert(
		primary.to_string(),
		fields
			.iter()
			.map(|(name, ty)| TypedDataField::new(*name, *ty))
			.collect(),
	);
	types
}

/// Field list of the `EIP712Domain` type for the four-field domain.
pub fn eip712_domain_fields() -> Vec<TypedDataField> {
	vec![
		TypedDataField::new("name", "string"),
		TypedDataField::new("version", "string"),
		TypedDataField::new("chainId", "uint256"),
		TypedDataField::new("verifyingContract", "address"),
	]
}

/// Returns `types` with `EIP712Domain` placed first and the caller's types
/// after it in their original order. An existing `EIP712Domain` entry is
/// replaced.
pub fn with_domain_type(types: &TypedDataTypes) -> TypedDataTypes {
	let mut out = TypedDataTypes::with_capacity(types.len() + 1);
	out.insert(EIP712_DOMAIN_TYPE.to_string(), eip712_domain_fields());
	for (name, fields) in types {
		if name != EIP712_DOMAIN_TYPE {
			out.insert(name.clone(), fields.clone());
		}
	}
	out
}

/// The primary type is the first key of the caller's type map.
pub fn primary_type(types: &TypedDataTypes) -> Option<&str> {
	types
		.keys()
		.map(String::as_str)
		.find(|name| *name != EIP712_DOMAIN_TYPE)
}

/// Complete typed-data object handed to object-style wallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataPayload {
	pub domain: TypedDataDomain,
	pub types: TypedDataTypes,
	pub primary_type: String,
	pub message: serde_json::Value,
}
