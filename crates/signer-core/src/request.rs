//! Body handed to the exchange request executor.

use serde::{Deserialize, Serialize};
use signer_types::{ActionValue, Signature};
use signer_wallet::WalletObject;

use crate::exchange::{sign_l1_action, L1ActionRequest};
use crate::SigningError;

/// `{action, nonce, signature, vaultAddress?, expiresAfter?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
	pub action: ActionValue,
	pub nonce: u64,
	pub signature: Signature,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vault_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_after: Option<u64>,
}

impl ExchangeRequest {
	pub fn new(action: ActionValue, nonce: u64, signature: Signature) -> Self {
		Self {
			action,
			nonce,
			signature,
			vault_address: None,
			expires_after: None,
		}
	}

	/// Signs an L1 action and packages it with the context it was signed with.
	pub async fn sign_l1(
		wallet: &dyn WalletObject,
		request: L1ActionRequest,
	) -> Result<Self, SigningError> {
		let signature = sign_l1_action(wallet, &request).await?;
		Ok(Self {
			action: request.action,
			nonce: request.nonce,
			signature,
			vault_address: request.vault_address,
			expires_after: request.expires_after,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use signer_types::SecretString;
	use signer_wallet::implementations::local::LocalWallet;

	const KEY: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";

	#[tokio::test]
	async fn test_signed_request_body() {
		let wallet = LocalWallet::new(&SecretString::from(KEY)).unwrap();
		let request = L1ActionRequest::new(
			json!({"type": "cancel", "cancels": [{"a": 0, "o": 12345}]}),
			1_234_567_890,
		);
		let body = ExchangeRequest::sign_l1(&wallet, request).await.unwrap();

		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			json!({
				"action": {"type": "cancel", "cancels": [{"a": 0, "o": 12345}]},
				"nonce": 1_234_567_890u64,
				"signature": {
					"r": "0x08bd3567b8376d8e227fe2ec3ab237c08af799f0296150d49ec4391ee0c1585f",
					"s": "0x4d1b70396f9b3d5b7f36503ff02cf5928bae9ba9d7d0716c8608fa0405323887",
					"v": 28
				}
			})
		);
	}

	#[test]
	fn test_optional_fields_serialized_when_present() {
		let signature = Signature::from_bytes(&[1u8; 65]).unwrap();
		let mut body = ExchangeRequest::new(ActionValue::from("noop"), 7, signature);
		body.vault_address = Some("0x1719884eb866cb12b2287399b15f7db5e7d775ea".into());
		body.expires_after = Some(1_700_000_000_000);

		let value = serde_json::to_value(&body).unwrap();
		assert_eq!(value["vaultAddress"], "0x1719884eb866cb12b2287399b15f7db5e7d775ea");
		assert_eq!(value["expiresAfter"], 1_700_000_000_000u64);

		let parsed: ExchangeRequest = serde_json::from_value(value).unwrap();
		assert_eq!(parsed, body);
	}
}
