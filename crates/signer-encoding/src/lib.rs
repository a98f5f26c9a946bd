//! Canonical encoding and action hashing.
//!
//! Exchange actions are authorised by signing a Keccak-256 digest of their
//! MessagePack encoding plus a few context fields. Two different MessagePack
//! libraries must agree on every byte, so this crate owns both the integer
//! normalisation that removes the encoders' freedom of choice and the exact
//! preimage layout of the action hash.

use thiserror::Error;

pub mod action_hash;
pub mod canonical;

pub use action_hash::{action_hash, action_hash_preimage, hash_serializable, ActionHash};
pub use canonical::{encode, encode_serializable, normalize};

/// Errors that can occur while canonically encoding a value.
#[derive(Debug, Error)]
pub enum EncodingError {
	/// The value cannot be represented as an action tree.
	#[error("Unsupported value: {0}")]
	Unsupported(String),
	/// An integer does not fit in the 64-bit MessagePack integer family.
	#[error("Integer out of range for canonical encoding: {0}")]
	IntegerOutOfRange(String),
	/// NaN and infinities have no canonical form.
	#[error("Non-finite number cannot be encoded: {0}")]
	NonFinite(f64),
	/// A string, array or map is longer than MessagePack allows.
	#[error("Length {0} exceeds the MessagePack limit")]
	TooLong(usize),
	/// The underlying writer failed.
	#[error("Write failed: {0}")]
	Write(String),
}

/// Errors that can occur while computing an action hash.
#[derive(Debug, Error)]
pub enum HashError {
	/// The action could not be canonically encoded.
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	/// A hex input (such as the vault address) is malformed.
	#[error("Decoding error: {0}")]
	Decoding(String),
}
