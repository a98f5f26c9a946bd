//! Structured action values.
//!
//! Actions are opaque, arbitrarily nested trees. `ActionValue` is the tagged
//! union every other layer walks: the canonical encoder normalises and encodes
//! it, the façade turns it into EIP-712 messages, and the CLI reads it from
//! JSON. Map entries keep their insertion order because the action hash is
//! sensitive to key order.

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer an IEEE-754 double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Ordered map used for action objects.
pub type ActionMap = IndexMap<String, ActionValue>;

/// A node of an action tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionValue {
	Null,
	Bool(bool),
	/// Native 64-bit integer.
	Int(i64),
	/// Arbitrary-precision integer. The canonical encoder writes these with the
	/// fixed 8-byte integer forms.
	BigInt(BigInt),
	/// Double-precision number with JavaScript number semantics.
	Float(f64),
	Str(String),
	Array(Vec<ActionValue>),
	Map(ActionMap),
}

impl ActionValue {
	/// Builds a map value from ordered `(key, value)` pairs.
	pub fn map<K, V, I>(entries: I) -> Self
	where
		K: Into<String>,
		V: Into<ActionValue>,
		I: IntoIterator<Item = (K, V)>,
	{
		ActionValue::Map(
			entries
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}

	/// Converts any serializable value into an action tree.
	///
	/// Struct fields keep their declaration order. Fails for values JSON cannot
	/// represent, such as maps with non-string keys.
	pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
		serde_json::to_value(value).map(ActionValue::from)
	}

	/// Converts the tree into a JSON value.
	///
	/// Integral floats in the safe range become JSON integers; big integers that
	/// do not fit in 64 bits become decimal strings.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			ActionValue::Null => serde_json::Value::Null,
			ActionValue::Bool(b) => serde_json::Value::Bool(*b),
			ActionValue::Int(i) => serde_json::Value::from(*i),
			ActionValue::BigInt(b) => bigint_to_json(b),
			ActionValue::Float(f) => float_to_json(*f),
			ActionValue::Str(s) => serde_json::Value::String(s.clone()),
			ActionValue::Array(items) => {
				serde_json::Value::Array(items.iter().map(ActionValue::to_json).collect())
			},
			ActionValue::Map(map) => serde_json::Value::Object(
				map.iter()
					.map(|(k, v)| (k.clone(), v.to_json()))
					.collect(),
			),
		}
	}

	/// Returns the map entries if this is a map.
	pub fn as_map(&self) -> Option<&ActionMap> {
		match self {
			ActionValue::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Returns the string slice if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			ActionValue::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Looks up a key when this is a map.
	pub fn get(&self, key: &str) -> Option<&ActionValue> {
		self.as_map().and_then(|map| map.get(key))
	}

	/// Short name of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			ActionValue::Null => "null",
			ActionValue::Bool(_) => "bool",
			ActionValue::Int(_) => "int",
			ActionValue::BigInt(_) => "bigint",
			ActionValue::Float(_) => "float",
			ActionValue::Str(_) => "string",
			ActionValue::Array(_) => "array",
			ActionValue::Map(_) => "map",
		}
	}
}

fn bigint_to_json(value: &BigInt) -> serde_json::Value {
	if let Some(i) = value.to_i64() {
		serde_json::Value::from(i)
	} else if let Some(u) = value.to_u64() {
		serde_json::Value::from(u)
	} else {
		serde_json::Value::String(value.to_string())
	}
}

fn float_to_json(value: f64) -> serde_json::Value {
	if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
		serde_json::Value::from(value as i64)
	} else {
		serde_json::Number::from_f64(value)
			.map(serde_json::Value::Number)
			.unwrap_or(serde_json::Value::Null)
	}
}

impl From<serde_json::Value> for ActionValue {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => ActionValue::Null,
			serde_json::Value::Bool(b) => ActionValue::Bool(b),
			serde_json::Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					ActionValue::Int(i)
				} else if let Some(u) = n.as_u64() {
					ActionValue::BigInt(BigInt::from(u))
				} else {
					ActionValue::Float(n.as_f64().unwrap_or(f64::NAN))
				}
			},
			serde_json::Value::String(s) => ActionValue::Str(s),
			serde_json::Value::Array(items) => {
				ActionValue::Array(items.into_iter().map(ActionValue::from).collect())
			},
			serde_json::Value::Object(map) => ActionValue::Map(
				map.into_iter()
					.map(|(k, v)| (k, ActionValue::from(v)))
					.collect(),
			),
		}
	}
}

impl From<bool> for ActionValue {
	fn from(value: bool) -> Self {
		ActionValue::Bool(value)
	}
}

impl From<i64> for ActionValue {
	fn from(value: i64) -> Self {
		ActionValue::Int(value)
	}
}

impl From<i32> for ActionValue {
	fn from(value: i32) -> Self {
		ActionValue::Int(value.into())
	}
}

impl From<u32> for ActionValue {
	fn from(value: u32) -> Self {
		ActionValue::Int(value.into())
	}
}

impl From<u64> for ActionValue {
	fn from(value: u64) -> Self {
		match i64::try_from(value) {
			Ok(i) => ActionValue::Int(i),
			Err(_) => ActionValue::BigInt(BigInt::from(value)),
		}
	}
}

impl From<f64> for ActionValue {
	fn from(value: f64) -> Self {
		ActionValue::Float(value)
	}
}

impl From<BigInt> for ActionValue {
	fn from(value: BigInt) -> Self {
		ActionValue::BigInt(value)
	}
}

impl From<&str> for ActionValue {
	fn from(value: &str) -> Self {
		ActionValue::Str(value.to_string())
	}
}

impl From<String> for ActionValue {
	fn from(value: String) -> Self {
		ActionValue::Str(value)
	}
}

impl<T: Into<ActionValue>> From<Vec<T>> for ActionValue {
	fn from(value: Vec<T>) -> Self {
		ActionValue::Array(value.into_iter().map(Into::into).collect())
	}
}

impl From<ActionMap> for ActionValue {
	fn from(value: ActionMap) -> Self {
		ActionValue::Map(value)
	}
}

impl Serialize for ActionValue {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.to_json().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for ActionValue {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		serde_json::Value::deserialize(deserializer).map(ActionValue::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_from_json_preserves_key_order() {
		let value = ActionValue::from(json!({"type": "cancel", "cancels": [], "a": 1}));
		let keys: Vec<&str> = value
			.as_map()
			.unwrap()
			.keys()
			.map(String::as_str)
			.collect();
		assert_eq!(keys, vec!["type", "cancels", "a"]);
	}

	#[test]
	fn test_from_json_numbers() {
		assert_eq!(ActionValue::from(json!(12345)), ActionValue::Int(12345));
		assert_eq!(ActionValue::from(json!(-7)), ActionValue::Int(-7));
		assert_eq!(ActionValue::from(json!(0.5)), ActionValue::Float(0.5));
		assert_eq!(
			ActionValue::from(json!(u64::MAX)),
			ActionValue::BigInt(BigInt::from(u64::MAX))
		);
	}

	#[test]
	fn test_from_u64_promotes_above_i64() {
		assert_eq!(ActionValue::from(5u64), ActionValue::Int(5));
		assert!(matches!(
			ActionValue::from(u64::MAX),
			ActionValue::BigInt(_)
		));
	}

	#[test]
	fn test_to_json_integral_float_becomes_integer() {
		assert_eq!(ActionValue::Float(1000.0).to_json(), json!(1000));
		assert_eq!(ActionValue::Float(0.25).to_json(), json!(0.25));
	}

	#[test]
	fn test_to_json_bigint_out_of_range_is_string() {
		let huge: BigInt = BigInt::from(u64::MAX) * 4u32;
		assert_eq!(
			ActionValue::BigInt(huge.clone()).to_json(),
			json!(huge.to_string())
		);
	}

	#[test]
	fn test_from_serialize_keeps_field_order() {
		#[derive(Serialize)]
		struct Cancel {
			a: u32,
			o: u64,
		}

		let value = ActionValue::from_serialize(&Cancel { a: 0, o: 12345 }).unwrap();
		assert_eq!(value, ActionValue::map([("a", 0i64), ("o", 12345i64)]));
	}

	#[test]
	fn test_from_serialize_rejects_non_string_keys() {
		let mut map = std::collections::BTreeMap::new();
		map.insert(vec![1u8], 1u8);
		assert!(ActionValue::from_serialize(&map).is_err());
	}

	#[test]
	fn test_deserialize_round_trips_through_json() {
		let value: ActionValue =
			serde_json::from_str(r#"{"type":"cancel","cancels":[{"a":0,"o":12345}]}"#).unwrap();
		assert_eq!(
			serde_json::to_string(&value).unwrap(),
			r#"{"type":"cancel","cancels":[{"a":0,"o":12345}]}"#
		);
	}
}
