//! Configuration for the exchange signer.
//!
//! Configuration is a TOML file with two sections:
//! - `[signer]` selects the network and the optional signing context
//!   (signature chain id, vault address, expiry window)
//! - `[wallet]` names the primary wallet implementation and holds one table
//!   per implementation under `[wallet.implementations.<name>]`
//!
//! `${VAR}` and `${VAR:-default}` are replaced with environment variables
//! before parsing, so keys never have to live in the file itself. The
//! resolved document is checked against [`config_schema`] before it is
//! deserialized.

use regex::Regex;
use serde::Deserialize;
use signer_types::{without_0x_prefix, Chain, Field, FieldType, Schema};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level signer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub signer: SignerConfig,
	pub wallet: WalletConfig,
}

/// Network and signing context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignerConfig {
	/// `mainnet` or `testnet`.
	#[serde(default)]
	pub network: Chain,
	/// Chain id for user-signed actions; defaults per network.
	pub signature_chain_id: Option<u64>,
	/// Vault or sub-account the actions are signed for.
	pub vault_address: Option<String>,
	/// Relative expiry window added to the nonce time, in milliseconds.
	pub expires_after_ms: Option<u64>,
}

impl SignerConfig {
	/// The configured signature chain id, or the network default.
	pub fn signature_chain_id(&self) -> u64 {
		self.signature_chain_id
			.unwrap_or_else(|| self.network.default_signature_chain_id())
	}

	/// Absolute expiry for a request whose nonce is `now_ms`.
	pub fn expires_after(&self, now_ms: u64) -> Option<u64> {
		self.expires_after_ms.map(|window| now_ms.saturating_add(window))
	}
}

/// Configuration for wallet selection.
///
/// Implementation tables hold private keys, so `Debug` lists only their names.
#[derive(Clone, Deserialize)]
pub struct WalletConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of wallet implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl WalletConfig {
	/// Configuration table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

impl fmt::Debug for WalletConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&String> = self.implementations.keys().collect();
		names.sort();
		f.debug_struct("WalletConfig")
			.field("primary", &self.primary)
			.field("implementations", &names)
			.finish()
	}
}

/// Shape of the resolved configuration document.
pub fn config_schema() -> Schema {
	let signer = Schema::new(
		vec![],
		vec![
			Field::new("network", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some("mainnet" | "testnet") => Ok(()),
					_ => Err("expected 'mainnet' or 'testnet'".to_string()),
				}
			}),
			Field::new("signature_chain_id", FieldType::Integer { min: Some(1), max: None }),
			Field::new("vault_address", FieldType::String).with_validator(|value| {
				let digits = without_0x_prefix(value.as_str().unwrap_or_default());
				if digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
					Ok(())
				} else {
					Err("not a 20-byte hex address".to_string())
				}
			}),
			Field::new("expires_after_ms", FieldType::Integer { min: Some(1), max: None }),
		],
	);
	let wallet = Schema::new(
		vec![
			Field::new("primary", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(primary) if !primary.is_empty() => Ok(()),
					_ => Err("primary implementation cannot be empty".to_string()),
				}
			}),
			Field::new("implementations", FieldType::Table(Schema::new(vec![], vec![]))),
		],
		vec![],
	);
	Schema::new(
		vec![Field::new("wallet", FieldType::Table(wallet))],
		vec![Field::new("signer", FieldType::Table(signer))],
	)
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default` for
/// `${VAR_NAME:-default}` when the variable is unset. Input is limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(var_name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					var_name.as_str()
				)));
			},
		};
		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads, resolves and validates a configuration file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await?;
		let config: Config = content.parse()?;
		tracing::debug!(
			path = %path.display(),
			network = %config.signer.network,
			wallet = %config.wallet.primary,
			"Loaded configuration"
		);
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.wallet.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary wallet '{}' has no [wallet.implementations.{}] table",
				self.wallet.primary, self.wallet.primary
			)));
		}
		Ok(())
	}
}

/// Parses TOML, resolving environment variables first and validating after.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let raw: toml::Value = toml::from_str(&resolved)?;
		config_schema()
			.validate(&raw)
			.map_err(|e| ConfigError::Validation(e.to_string()))?;
		let config: Config = raw.try_into()?;
		config.validate()?;
		Ok(config)
	}
}
