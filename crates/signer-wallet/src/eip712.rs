//! EIP-712 hashing over JSON typed data.
//!
//! Struct names are used verbatim, so namespaced types such as
//! `HyperliquidTransaction:UsdSend` hash like any other name. Each struct is
//! encoded as the ABI tuple of its type hash and one 32-byte word per field.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{hex, keccak256, Address, B256, I256, U256};
use serde_json::Value;
use signer_types::{without_0x_prefix, TypedDataField, TypedDataTypes, EIP712_DOMAIN_TYPE};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::WalletError;

/// Domain fields in canonical order, used when `types` has no `EIP712Domain`.
const DOMAIN_FIELDS: [(&str, &str); 5] = [
	("name", "string"),
	("version", "string"),
	("chainId", "uint256"),
	("verifyingContract", "address"),
	("salt", "bytes32"),
];

fn invalid(message: impl Into<String>) -> WalletError {
	WalletError::InvalidTypedData(message.into())
}

/// Digest a wallet signs for a `{domain, types, primaryType, message}` object.
pub fn signing_hash(typed_data: &Value) -> Result<B256, WalletError> {
	let types: TypedDataTypes = serde_json::from_value(
		typed_data
			.get("types")
			.cloned()
			.ok_or_else(|| invalid("missing types"))?,
	)
	.map_err(|e| invalid(e.to_string()))?;
	let primary = typed_data
		.get("primaryType")
		.and_then(Value::as_str)
		.ok_or_else(|| invalid("missing primaryType"))?;
	let domain = typed_data
		.get("domain")
		.ok_or_else(|| invalid("missing domain"))?;
	let message = typed_data
		.get("message")
		.ok_or_else(|| invalid("missing message"))?;

	let mut preimage = Vec::with_capacity(66);
	preimage.extend_from_slice(&[0x19, 0x01]);
	preimage.extend_from_slice(domain_separator(domain, &types)?.as_slice());
	if primary != EIP712_DOMAIN_TYPE {
		preimage.extend_from_slice(hash_struct(&types, primary, message)?.as_slice());
	}
	Ok(keccak256(preimage))
}

/// Struct hash of the domain.
///
/// Without an `EIP712Domain` entry in `types`, the domain type is made of the
/// standard fields present in `domain`.
pub fn domain_separator(domain: &Value, types: &TypedDataTypes) -> Result<B256, WalletError> {
	if types.contains_key(EIP712_DOMAIN_TYPE) {
		return hash_struct(types, EIP712_DOMAIN_TYPE, domain);
	}
	let fields = DOMAIN_FIELDS
		.iter()
		.filter(|(name, _)| domain.get(*name).is_some_and(|value| !value.is_null()))
		.map(|(name, ty)| TypedDataField::new(*name, *ty))
		.collect();
	let mut with_domain = types.clone();
	with_domain.insert(EIP712_DOMAIN_TYPE.to_string(), fields);
	hash_struct(&with_domain, EIP712_DOMAIN_TYPE, domain)
}

/// `Name(type field,...)` of `primary` followed by its referenced struct
/// types in alphabetical order.
pub fn encode_type(types: &TypedDataTypes, primary: &str) -> Result<String, WalletError> {
	let mut dependencies = BTreeSet::new();
	collect_dependencies(types, primary, &mut dependencies)?;
	dependencies.remove(primary);

	let mut out = String::new();
	for name in std::iter::once(primary).chain(dependencies.iter().map(String::as_str)) {
		let fields = types
			.get(name)
			.ok_or_else(|| invalid(format!("unknown type {}", name)))?;
		let members: Vec<String> = fields
			.iter()
			.map(|field| format!("{} {}", field.type_name, field.name))
			.collect();
		out.push_str(name);
		out.push('(');
		out.push_str(&members.join(","));
		out.push(')');
	}
	Ok(out)
}

fn collect_dependencies(
	types: &TypedDataTypes,
	name: &str,
	found: &mut BTreeSet<String>,
) -> Result<(), WalletError> {
	if found.contains(name) {
		return Ok(());
	}
	let fields = types
		.get(name)
		.ok_or_else(|| invalid(format!("unknown type {}", name)))?;
	found.insert(name.to_string());
	for field in fields {
		let base = base_type(&field.type_name);
		if types.contains_key(base) {
			collect_dependencies(types, base, found)?;
		}
	}
	Ok(())
}

/// `Person[][3]` -> `Person`
fn base_type(type_name: &str) -> &str {
	type_name.split('[').next().unwrap_or(type_name)
}

/// `keccak256(typeHash || encodeData(data))` for the struct type `name`.
pub fn hash_struct(types: &TypedDataTypes, name: &str, data: &Value) -> Result<B256, WalletError> {
	let fields = types
		.get(name)
		.ok_or_else(|| invalid(format!("unknown type {}", name)))?;

	let mut words = Vec::with_capacity(fields.len() + 1);
	words.push(word(keccak256(encode_type(types, name)?)));
	for field in fields {
		let value = data
			.get(field.name.as_str())
			.ok_or_else(|| invalid(format!("{} is missing field {}", name, field.name)))?;
		words.push(encode_value(types, &field.type_name, value)?);
	}
	Ok(keccak256(DynSolValue::Tuple(words).abi_encode()))
}

fn word(hash: B256) -> DynSolValue {
	DynSolValue::FixedBytes(hash, 32)
}

fn encode_value(
	types: &TypedDataTypes,
	type_name: &str,
	value: &Value,
) -> Result<DynSolValue, WalletError> {
	let mismatch = || invalid(format!("value {} does not fit type {}", value, type_name));

	if let Some(element) = type_name
		.strip_suffix(']')
		.and_then(|outer| outer.rfind('[').map(|i| &outer[..i]))
	{
		let items = value.as_array().ok_or_else(mismatch)?;
		let words = items
			.iter()
			.map(|item| encode_value(types, element, item))
			.collect::<Result<Vec<_>, _>>()?;
		return Ok(word(keccak256(DynSolValue::Tuple(words).abi_encode())));
	}
	if types.contains_key(type_name) {
		return Ok(word(hash_struct(types, type_name, value)?));
	}

	match type_name {
		"string" => Ok(word(keccak256(value.as_str().ok_or_else(mismatch)?))),
		"bytes" => Ok(word(keccak256(decode_hex(value).ok_or_else(mismatch)?))),
		"bool" => value.as_bool().map(DynSolValue::Bool).ok_or_else(mismatch),
		"address" => value
			.as_str()
			.and_then(|s| Address::from_str(s).ok())
			.map(DynSolValue::Address)
			.ok_or_else(mismatch),
		_ => {
			if let Some(bits) = type_name.strip_prefix("uint") {
				let bits = parse_bits(bits).ok_or_else(mismatch)?;
				let number = parse_uint(value)
					.filter(|n| n.bit_len() <= bits)
					.ok_or_else(mismatch)?;
				Ok(DynSolValue::Uint(number, bits))
			} else if let Some(bits) = type_name.strip_prefix("int") {
				let bits = parse_bits(bits).ok_or_else(mismatch)?;
				Ok(DynSolValue::Int(parse_int(value).ok_or_else(mismatch)?, bits))
			} else if let Some(size) = type_name.strip_prefix("bytes") {
				let size = size
					.parse::<usize>()
					.ok()
					.filter(|n| (1..=32).contains(n))
					.ok_or_else(mismatch)?;
				let bytes = decode_hex(value)
					.filter(|bytes| bytes.len() == size)
					.ok_or_else(mismatch)?;
				let mut padded = B256::ZERO;
				padded[..size].copy_from_slice(&bytes);
				Ok(DynSolValue::FixedBytes(padded, size))
			} else {
				Err(invalid(format!("unsupported type {}", type_name)))
			}
		},
	}
}

fn parse_bits(bits: &str) -> Option<usize> {
	bits.parse::<usize>()
		.ok()
		.filter(|bits| *bits > 0 && *bits <= 256 && bits % 8 == 0)
}

fn decode_hex(value: &Value) -> Option<Vec<u8>> {
	value
		.as_str()
		.and_then(|s| hex::decode(without_0x_prefix(s)).ok())
}

/// Integers arrive as JSON numbers or as decimal / `0x` hex strings.
fn parse_uint(value: &Value) -> Option<U256> {
	match value {
		Value::Number(n) => n.as_u64().map(U256::from),
		Value::String(s) => match s.strip_prefix("0x") {
			Some(digits) => U256::from_str_radix(digits, 16).ok(),
			None => U256::from_str_radix(s, 10).ok(),
		},
		_ => None,
	}
}

fn parse_int(value: &Value) -> Option<I256> {
	match value {
		Value::Number(n) if n.is_i64() || n.is_u64() => I256::from_dec_str(&n.to_string()).ok(),
		Value::String(s) if s.starts_with("0x") => I256::from_hex_str(s).ok(),
		Value::String(s) => I256::from_dec_str(s).ok(),
		_ => None,
	}
}
