//! Canonical MessagePack encoding of action trees.
//!
//! Every value has exactly one encoding. Integers use the most compact form
//! except arbitrary-precision integers, which are always written with the
//! 8-byte forms. Because independent encoders disagree on how to write large
//! integers held as doubles, [`normalize`] first promotes those to
//! [`ActionValue::BigInt`] so the choice is made explicitly.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::Serialize;
use signer_types::{ActionValue, MAX_SAFE_INTEGER};

use crate::EncodingError;

/// Lower bound (exclusive) of the integer window left to the compact encoder.
const PROMOTE_BELOW: f64 = -2_147_483_648.0;
/// Upper bound (inclusive) from which integers are promoted.
const PROMOTE_FROM: f64 = 4_294_967_296.0;

fn is_safe_integer(value: f64) -> bool {
	value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER
}

fn should_promote(value: f64) -> bool {
	is_safe_integer(value) && (value < PROMOTE_BELOW || value >= PROMOTE_FROM)
}

/// Promotes large safe-integer floats to big integers, recursively.
///
/// A float is promoted when it is a mathematical integer within ±(2^53 - 1)
/// and is below -2^31 or at least 2^32. Everything else is returned as-is, so
/// applying the function twice yields the same tree.
pub fn normalize(value: &ActionValue) -> ActionValue {
	match value {
		ActionValue::Float(f) if should_promote(*f) => ActionValue::BigInt(BigInt::from(*f as i64)),
		ActionValue::Array(items) => ActionValue::Array(items.iter().map(normalize).collect()),
		ActionValue::Map(map) => ActionValue::Map(
			map.iter()
				.map(|(k, v)| (k.clone(), normalize(v)))
				.collect(),
		),
		other => other.clone(),
	}
}

/// Normalizes and encodes an action tree.
pub fn encode(value: &ActionValue) -> Result<Vec<u8>, EncodingError> {
	let normalized = normalize(value);
	let mut buf = Vec::with_capacity(64);
	write_value(&mut buf, &normalized)?;
	Ok(buf)
}

/// Converts a serializable value to an action tree and encodes it.
pub fn encode_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodingError> {
	let tree = ActionValue::from_serialize(value)
		.map_err(|e| EncodingError::Unsupported(e.to_string()))?;
	encode(&tree)
}

fn write_err<E: std::fmt::Display>(err: E) -> EncodingError {
	EncodingError::Write(err.to_string())
}

fn length(len: usize) -> Result<u32, EncodingError> {
	u32::try_from(len).map_err(|_| EncodingError::TooLong(len))
}

fn write_int(buf: &mut Vec<u8>, value: i64) -> Result<(), EncodingError> {
	if value >= 0 {
		rmp::encode::write_uint(buf, value as u64).map_err(write_err)?;
	} else {
		rmp::encode::write_sint(buf, value).map_err(write_err)?;
	}
	Ok(())
}

fn write_big_int(buf: &mut Vec<u8>, value: &BigInt) -> Result<(), EncodingError> {
	if let Some(u) = value.to_u64() {
		rmp::encode::write_u64(buf, u).map_err(write_err)
	} else if let Some(i) = value.to_i64() {
		rmp::encode::write_i64(buf, i).map_err(write_err)
	} else {
		Err(EncodingError::IntegerOutOfRange(value.to_string()))
	}
}

fn write_float(buf: &mut Vec<u8>, value: f64) -> Result<(), EncodingError> {
	if !value.is_finite() {
		return Err(EncodingError::NonFinite(value));
	}
	if should_promote(value) {
		return write_big_int(buf, &BigInt::from(value as i64));
	}
	if is_safe_integer(value) {
		return write_int(buf, value as i64);
	}
	rmp::encode::write_f64(buf, value).map_err(write_err)
}

fn write_value(buf: &mut Vec<u8>, value: &ActionValue) -> Result<(), EncodingError> {
	match value {
		ActionValue::Null => rmp::encode::write_nil(buf).map_err(write_err),
		ActionValue::Bool(b) => rmp::encode::write_bool(buf, *b).map_err(write_err),
		ActionValue::Int(i) => write_int(buf, *i),
		ActionValue::BigInt(b) => write_big_int(buf, b),
		ActionValue::Float(f) => write_float(buf, *f),
		ActionValue::Str(s) => {
			length(s.len())?;
			rmp::encode::write_str(buf, s).map_err(write_err)
		},
		ActionValue::Array(items) => {
			rmp::encode::write_array_len(buf, length(items.len())?).map_err(write_err)?;
			items.iter().try_for_each(|item| write_value(buf, item))
		},
		ActionValue::Map(map) => {
			rmp::encode::write_map_len(buf, length(map.len())?).map_err(write_err)?;
			for (key, item) in map {
				length(key.len())?;
				rmp::encode::write_str(buf, key).map_err(write_err)?;
				write_value(buf, item)?;
			}
			Ok(())
		},
	}
}
