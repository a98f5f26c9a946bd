//! Local private-key wallet.
//!
//! Signs typed data in-process with an alloy [`PrivateKeySigner`]. It exposes
//! the single-object `signTypedData` shape, so it goes through exactly the
//! same detection and call path as an injected viem account.

use alloy_primitives::{hex, Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::Value;
use signer_types::{
	without_0x_prefix, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	SecretString, ValidationError,
};
use std::str::FromStr;

use crate::detect::SIGN_TYPED_DATA;
use crate::eip712::signing_hash;
use crate::{ProviderError, WalletError, WalletFactory, WalletMethod, WalletObject, WalletRegistry};

/// Wallet backed by a private key held in memory.
#[derive(Clone)]
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Parses a hex private key (with or without `0x`).
	pub fn new(private_key: &SecretString) -> Result<Self, WalletError> {
		let key = private_key
			.with_exposed(|key| B256::from_str(without_0x_prefix(key)))
			.map_err(|e| WalletError::InvalidKey(format!("Failed to parse private key: {}", e)))?;
		let signer = PrivateKeySigner::from_bytes(&key)
			.map_err(|e| WalletError::InvalidKey(format!("Invalid private key: {}", e)))?;
		Ok(Self { signer })
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs an EIP-712 typed-data object and returns `0x` + 65 bytes of hex.
	pub fn sign_typed_data_json(&self, typed_data: &Value) -> Result<String, WalletError> {
		let hash = signing_hash(typed_data)?;
		let signature = self
			.signer
			.sign_hash_sync(&hash)
			.map_err(|e| WalletError::Provider(Box::new(e)))?;
		tracing::debug!(
			signer = %self.signer.address(),
			primary_type = ?typed_data.get("primaryType").and_then(serde_json::Value::as_str),
			"Signed typed data locally"
		);
		Ok(format!("0x{}", hex::encode(signature.as_bytes())))
	}
}

impl std::fmt::Debug for LocalWallet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalWallet")
			.field("address", &self.signer.address())
			.finish()
	}
}

#[async_trait]
impl WalletMethod for LocalWallet {
	fn arity(&self) -> usize {
		1
	}

	async fn call(&self, args: Vec<Value>) -> Result<Value, ProviderError> {
		let typed_data = args
			.first()
			.ok_or_else(|| WalletError::InvalidTypedData("missing typed data argument".into()))?;
		Ok(Value::String(self.sign_typed_data_json(typed_data)?))
	}
}

impl WalletObject for LocalWallet {
	fn method(&self, name: &str) -> Option<&dyn WalletMethod> {
		(name == SIGN_TYPED_DATA).then_some(self as &dyn WalletMethod)
	}
}

/// Configuration schema for LocalWallet.
pub struct LocalWalletSchema;

impl ConfigSchema for LocalWalletSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("private_key", FieldType::String).with_validator(|value| {
				let key = value.as_str().unwrap_or_default();
				let digits = without_0x_prefix(key);
				if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
					return Err("must be 32 bytes of hex".to_string());
				}
				Ok(())
			})],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a local wallet from configuration.
///
/// Configuration parameters:
/// - `private_key`: hex private key, usually `${HL_PRIVATE_KEY}`
pub fn create_wallet(config: &toml::Value) -> Result<Box<dyn WalletObject>, WalletError> {
	LocalWalletSchema
		.validate(config)
		.map_err(|e| WalletError::Configuration(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| WalletError::Configuration("private_key is required".into()))?;

	let wallet = LocalWallet::new(&private_key)?;
	tracing::info!(address = %wallet.address(), "Loaded local wallet");
	Ok(Box::new(wallet))
}

/// Registry for the local wallet implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = WalletFactory;

	fn factory() -> Self::Factory {
		create_wallet
	}
}

impl WalletRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::detect::{detect, WalletKind};
	use serde_json::json;

	const KEY: &str = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";

	fn usd_send() -> Value {
		json!({
			"domain": {
				"name": "HyperliquidSignTransaction",
				"version": "1",
				"chainId": 42161,
				"verifyingContract": "0x0000000000000000000000000000000000000000"
			},
			"types": {
				"EIP712Domain": [
					{"name": "name", "type": "string"},
					{"name": "version", "type": "string"},
					{"name": "chainId", "type": "uint256"},
					{"name": "verifyingContract", "type": "address"}
				],
				"HyperliquidTransaction:UsdSend": [
					{"name": "hyperliquidChain", "type": "string"},
					{"name": "destination", "type": "string"},
					{"name": "amount", "type": "string"},
					{"name": "time", "type": "uint64"}
				]
			},
			"primaryType": "HyperliquidTransaction:UsdSend",
			"message": {
				"hyperliquidChain": "Mainnet",
				"destination": "0x0d1d9635d0640821d15e323ac8adadfa9c111414",
				"amount": "1",
				"time": 1690393044548u64
			}
		})
	}

	#[test]
	fn test_address_from_key() {
		let wallet = LocalWallet::new(&SecretString::from(KEY)).unwrap();
		assert_eq!(
			wallet.address().to_string().to_lowercase(),
			"0xcd49bbac6e85fdeb167eb7ca41a945d2b8758f6f"
		);
	}

	#[test]
	fn test_signs_usd_send() {
		let wallet = LocalWallet::new(&SecretString::from(format!("0x{}", KEY))).unwrap();
		assert_eq!(
			wallet.sign_typed_data_json(&usd_send()).unwrap(),
			"0xeca6267bcaadc4c0ae1aed73f5a2c45fcdbb7271f2e9356992404e5d4bad75a3572e08fe93f17755abadb7f84be7d1e9c4ce48bb5633e339bc430c672d5a20ed1b"
		);
	}

	#[tokio::test]
	async fn test_detected_as_viem() {
		let wallet = LocalWallet::new(&SecretString::from(KEY)).unwrap();
		assert_eq!(detect(&wallet), Some(WalletKind::Viem));
		let method = wallet.method("signTypedData").unwrap();
		let result = method.call(vec![usd_send()]).await.unwrap();
		assert!(result.as_str().unwrap().ends_with("1b"));
	}

	#[test]
	fn test_rejects_bad_keys() {
		assert!(matches!(
			LocalWallet::new(&SecretString::from("0x1234")),
			Err(WalletError::InvalidKey(_))
		));
		assert!(matches!(
			LocalWallet::new(&SecretString::from("00".repeat(32))),
			Err(WalletError::InvalidKey(_))
		));
	}

	#[test]
	fn test_factory_validates_config() {
		let config: toml::Value = toml::from_str("private_key = \"0x12\"").unwrap();
		assert!(matches!(
			create_wallet(&config),
			Err(WalletError::Configuration(_))
		));

		let config: toml::Value = toml::from_str(&format!("private_key = \"{}\"", KEY)).unwrap();
		let wallet = create_wallet(&config).unwrap();
		assert_eq!(detect(wallet.as_ref()), Some(WalletKind::Viem));
	}

	#[test]
	fn test_malformed_typed_data() {
		let wallet = LocalWallet::new(&SecretString::from(KEY)).unwrap();
		assert!(matches!(
			wallet.sign_typed_data_json(&json!({"message": {}})),
			Err(WalletError::InvalidTypedData(_))
		));
	}
}
