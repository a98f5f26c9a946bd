//! Action hash: the digest an L1 action signature commits to.
//!
//! Preimage layout:
//!
//! ```text
//! msgpack(action) || nonce (u64 BE) || 0x01 vault (20 bytes) | 0x00 || [0x00 expires (u64 BE)]
//! ```
//!
//! An absent vault still contributes its marker byte; an absent expiry
//! contributes nothing.

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};
use signer_types::{without_0x_prefix, ActionValue};
use std::fmt;

use crate::canonical::{encode, encode_serializable};
use crate::HashError;

const ADDRESS_LENGTH: usize = 20;

/// Keccak-256 digest of an action and its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionHash(pub B256);

impl From<ActionHash> for B256 {
	fn from(hash: ActionHash) -> Self {
		hash.0
	}
}

impl fmt::Display for ActionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

fn decode_vault(vault_address: &str) -> Result<[u8; ADDRESS_LENGTH], HashError> {
	let bytes = hex::decode(without_0x_prefix(vault_address))
		.map_err(|e| HashError::Decoding(format!("vault address: {}", e)))?;
	<[u8; ADDRESS_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| {
		HashError::Decoding(format!(
			"vault address must be {} bytes, got {}",
			ADDRESS_LENGTH,
			bytes.len()
		))
	})
}

fn append_context(
	preimage: &mut Vec<u8>,
	nonce: u64,
	vault_address: Option<&str>,
	expires_after: Option<u64>,
) -> Result<(), HashError> {
	preimage.extend_from_slice(&nonce.to_be_bytes());
	match vault_address {
		Some(vault) => {
			let vault = decode_vault(vault)?;
			preimage.push(0x01);
			preimage.extend_from_slice(&vault);
		},
		None => preimage.push(0x00),
	}
	if let Some(expires) = expires_after {
		preimage.push(0x00);
		preimage.extend_from_slice(&expires.to_be_bytes());
	}
	Ok(())
}

/// Returns the bytes that [`action_hash`] feeds to Keccak-256.
pub fn action_hash_preimage(
	action: &ActionValue,
	nonce: u64,
	vault_address: Option<&str>,
	expires_after: Option<u64>,
) -> Result<Vec<u8>, HashError> {
	let mut preimage = encode(action)?;
	append_context(&mut preimage, nonce, vault_address, expires_after)?;
	Ok(preimage)
}

/// Hashes an action with its nonce, optional vault and optional expiry.
pub fn action_hash(
	action: &ActionValue,
	nonce: u64,
	vault_address: Option<&str>,
	expires_after: Option<u64>,
) -> Result<ActionHash, HashError> {
	let preimage = action_hash_preimage(action, nonce, vault_address, expires_after)?;
	let hash = ActionHash(keccak256(&preimage));
	tracing::trace!(
		nonce,
		preimage_len = preimage.len(),
		hash = %hash,
		"Computed action hash"
	);
	Ok(hash)
}

/// [`action_hash`] for any serializable action type.
pub fn hash_serializable<T: Serialize + ?Sized>(
	action: &T,
	nonce: u64,
	vault_address: Option<&str>,
	expires_after: Option<u64>,
) -> Result<ActionHash, HashError> {
	let mut preimage = encode_serializable(action)?;
	append_context(&mut preimage, nonce, vault_address, expires_after)?;
	Ok(ActionHash(keccak256(&preimage)))
}
