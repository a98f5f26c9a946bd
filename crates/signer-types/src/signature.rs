//! ECDSA signature components in the shape the exchange expects.
//!
//! Wallets hand back a 65-byte signature as hex (`r || s || v`). The exchange
//! wants the three components separately, so every signing path ends with
//! [`Signature::split`].

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::without_0x_prefix;

/// Length in bytes of a `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Errors that can occur while parsing a signature.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
	/// The signature is not valid hex.
	#[error("Invalid signature hex: {0}")]
	InvalidHex(String),
	/// The signature does not decode to exactly 65 bytes.
	#[error("Invalid signature length: expected 65 bytes, got {0}")]
	InvalidLength(usize),
}

/// Split signature: two 32-byte scalars and the recovery byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
	pub r: B256,
	pub s: B256,
	pub v: u8,
}

impl Signature {
	/// Splits a 65-byte hex signature into `{r, s, v}` by fixed offsets.
	///
	/// The `0x` prefix is optional. `v` is taken verbatim from the last byte,
	/// so wallets that return 0/1 instead of 27/28 are passed through as-is.
	pub fn split(signature_hex: &str) -> Result<Self, SignatureError> {
		let bytes = hex::decode(without_0x_prefix(signature_hex))
			.map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
		Self::from_bytes(&bytes)
	}

	/// Builds a signature from its raw 65-byte form.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
		if bytes.len() != SIGNATURE_LENGTH {
			return Err(SignatureError::InvalidLength(bytes.len()));
		}
		Ok(Self {
			r: B256::from_slice(&bytes[0..32]),
			s: B256::from_slice(&bytes[32..64]),
			v: bytes[64],
		})
	}

	/// Returns the raw `r || s || v` bytes.
	pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
		let mut out = [0u8; SIGNATURE_LENGTH];
		out[0..32].copy_from_slice(self.r.as_slice());
		out[32..64].copy_from_slice(self.s.as_slice());
		out[64] = self.v;
		out
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.to_bytes()))
	}
}

impl FromStr for Signature {
	type Err = SignatureError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::split(s)
	}
}
