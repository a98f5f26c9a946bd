//! Schema checks for implementation-specific TOML tables.
//!
//! Each wallet implementation owns a `[wallet.implementations.<name>]` table
//! whose shape only that implementation knows. It describes the table with a
//! [`Schema`] and the factory validates it before building anything. The
//! configuration loader checks the whole document the same way.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	Table(Schema),
}

/// Custom check run after the type check passes.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named field with its type and an optional custom check.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a custom check; its error message becomes
	/// [`ValidationError::InvalidValue`].
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		check_type(&self.name, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Required and optional fields of a TOML table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Checks that `config` is a table, required fields are present, and every
	/// present field has the declared type and passes its validator.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| mismatch("root", "table", config))?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}
		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}
		Ok(())
	}
}

fn mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn check_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String if !value.is_str() => Err(mismatch(field_name, "string", value)),
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| mismatch(field_name, "integer", value))?;
			let out_of_range = match (min, max) {
				(Some(min), _) if int_val < *min => Some(format!("Value {} is less than minimum {}", int_val, min)),
				(_, Some(max)) if int_val > *max => Some(format!("Value {} is greater than maximum {}", int_val, max)),
				_ => None,
			};
			match out_of_range {
				Some(message) => Err(ValidationError::InvalidValue {
					field: field_name.to_string(),
					message,
				}),
				None => Ok(()),
			}
		},
		FieldType::Table(schema) => schema.validate(value).map_err(|e| match e {
			ValidationError::MissingField(f) => {
				ValidationError::MissingField(format!("{}.{}", field_name, f))
			},
			ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
				field: format!("{}.{}", field_name, field),
				message,
			},
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => ValidationError::TypeMismatch {
				field: format!("{}.{}", field_name, field),
				expected,
				actual,
			},
		}),
		_ => Ok(()),
	}
}

/// Implemented by anything that can validate its own configuration table.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![Field::new("private_key", FieldType::String).with_validator(|v| {
				match v.as_str() {
					Some(s) if s.starts_with("0x") => Ok(()),
					_ => Err("must start with 0x".to_string()),
				}
			})],
			vec![Field::new(
				"limits",
				FieldType::Table(Schema::new(
					vec![Field::new("max", FieldType::Integer { min: Some(1), max: Some(10) })],
					vec![],
				)),
			)],
		)
	}

	#[test]
	fn test_valid_table() {
		let config: toml::Value = toml::from_str("private_key = \"0xabc\"").unwrap();
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn test_missing_required_field() {
		let config: toml::Value = toml::from_str("other = 1").unwrap();
		assert_eq!(
			schema().validate(&config),
			Err(ValidationError::MissingField("private_key".into()))
		);
	}

	#[test]
	fn test_type_mismatch_and_validator() {
		let config: toml::Value = toml::from_str("private_key = 5").unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::TypeMismatch { .. })
		));

		let config: toml::Value = toml::from_str("private_key = \"abc\"").unwrap();
		assert!(matches!(
			schema().validate(&config),
			Err(ValidationError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_nested_field_names_are_qualified() {
		let config: toml::Value =
			toml::from_str("private_key = \"0x1\"\n[limits]\nmax = 11").unwrap();
		match schema().validate(&config) {
			Err(ValidationError::InvalidValue { field, .. }) => assert_eq!(field, "limits.max"),
			other => panic!("unexpected result: {:?}", other),
		}
	}
}
