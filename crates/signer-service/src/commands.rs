//! Subcommands of the `hl-sign` binary.
//!
//! Each command reads an action from a JSON file, applies the signing context
//! from the configuration and returns the JSON document printed on stdout.

use clap::Subcommand;
use serde_json::{json, Value};
use signer_config::Config;
use signer_core::{
	sign_l1_multi_sig_part, sign_multi_sig_action, sign_user_signed_action,
	sign_user_signed_multi_sig_part, signature_chain_id, with_chain_fields, ExchangeRequest,
	L1ActionRequest, MultiSigAction, SigningError, UserSignedKind,
};
use signer_types::{current_timestamp_millis, ActionValue, Signature};
use signer_wallet::{WalletError, WalletService};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by a command.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error(transparent)]
	Signing(#[from] SigningError),
	#[error(transparent)]
	Wallet(#[from] WalletError),
	#[error("Invalid input: {0}")]
	Input(String),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
	/// Print the action hash of an L1 action
	Hash {
		/// JSON file holding the action
		#[arg(short, long)]
		action: PathBuf,
		/// Nonce in milliseconds (defaults to now)
		#[arg(short, long)]
		nonce: Option<u64>,
	},
	/// Sign an L1 action and print the exchange request body
	SignL1 {
		#[arg(short, long)]
		action: PathBuf,
		#[arg(short, long)]
		nonce: Option<u64>,
	},
	/// Sign a user-signed action (usdSend, withdraw3, spotSend, ...)
	SignUser {
		#[arg(short, long)]
		action: PathBuf,
		/// Used only when the action has no `time`/`nonce` field
		#[arg(short, long)]
		nonce: Option<u64>,
	},
	/// Sign one co-signer's part of a multi-sig action
	MultisigPart {
		#[arg(short, long)]
		action: PathBuf,
		#[arg(long)]
		multi_sig_user: String,
		#[arg(long)]
		outer_signer: String,
		#[arg(short, long)]
		nonce: Option<u64>,
	},
	/// Collect co-signer signatures into a multiSig action and sign it
	MultisigSend {
		#[arg(short, long)]
		action: PathBuf,
		/// JSON file holding an array of `{r, s, v}` signatures
		#[arg(long)]
		signatures: PathBuf,
		#[arg(long)]
		multi_sig_user: String,
		#[arg(long)]
		outer_signer: String,
		#[arg(short, long)]
		nonce: Option<u64>,
	},
}

/// Runs a command against the loaded configuration.
pub async fn run(command: Command, config: &Config) -> Result<Value, CommandError> {
	match command {
		Command::Hash { action, nonce } => {
			let request = l1_request(config, read_action(&action).await?, nonce);
			let hash = request.hash()?;
			Ok(json!({ "actionHash": hash.to_string(), "nonce": request.nonce }))
		},
		Command::SignL1 { action, nonce } => {
			let wallet = build_wallet(config)?;
			let request = l1_request(config, read_action(&action).await?, nonce);
			let body = ExchangeRequest::sign_l1(wallet.wallet(), request).await?;
			Ok(serde_json::to_value(body)?)
		},
		Command::SignUser { action, nonce } => {
			let wallet = build_wallet(config)?;
			let prepared = prepare_user_signed(config, read_action(&action).await?, nonce)?;
			let signature = sign_user_signed_action(
				wallet.wallet(),
				&prepared.action,
				&prepared.kind.types(),
				prepared.chain_id,
			)
			.await?;
			let body = ExchangeRequest::new(prepared.action, prepared.nonce, signature);
			Ok(serde_json::to_value(body)?)
		},
		Command::MultisigPart {
			action,
			multi_sig_user,
			outer_signer,
			nonce,
		} => {
			let wallet = build_wallet(config)?;
			let action = read_action(&action).await?;
			let signature = if UserSignedKind::from_action(&action).is_some() {
				let prepared = prepare_user_signed(config, action, nonce)?;
				sign_user_signed_multi_sig_part(
					wallet.wallet(),
					&prepared.action,
					&prepared.kind.types(),
					prepared.chain_id,
					&multi_sig_user,
					&outer_signer,
				)
				.await?
			} else {
				let request = l1_request(config, action, nonce);
				sign_l1_multi_sig_part(wallet.wallet(), &request, &multi_sig_user, &outer_signer)
					.await?
			};
			Ok(json!({ "signature": signature }))
		},
		Command::MultisigSend {
			action,
			signatures,
			multi_sig_user,
			outer_signer,
			nonce,
		} => {
			let wallet = build_wallet(config)?;
			let inner = read_action(&action).await?;
			let signatures: Vec<Signature> =
				serde_json::from_str(&tokio::fs::read_to_string(&signatures).await?)?;
			let nonce = nonce.unwrap_or_else(current_timestamp_millis);
			let vault_address = config.signer.vault_address.clone();
			let expires_after = config.signer.expires_after(nonce);

			let multi_sig = MultiSigAction::new(
				config.signer.signature_chain_id(),
				&multi_sig_user,
				&outer_signer,
				inner,
				signatures,
			);
			let signature = sign_multi_sig_action(
				wallet.wallet(),
				&multi_sig,
				nonce,
				vault_address.as_deref(),
				expires_after,
				config.signer.network,
			)
			.await?;

			let mut body = ExchangeRequest::new(ActionValue::from(&multi_sig), nonce, signature);
			body.vault_address = vault_address;
			body.expires_after = expires_after;
			Ok(serde_json::to_value(body)?)
		},
	}
}

async fn read_action(path: &Path) -> Result<ActionValue, CommandError> {
	let content = tokio::fs::read_to_string(path).await?;
	Ok(serde_json::from_str(&content)?)
}

fn build_wallet(config: &Config) -> Result<WalletService, CommandError> {
	let implementation = config.wallet.primary_config().ok_or_else(|| {
		CommandError::Input(format!("no configuration for wallet '{}'", config.wallet.primary))
	})?;
	Ok(WalletService::from_config(&config.wallet.primary, implementation)?)
}

fn l1_request(config: &Config, action: ActionValue, nonce: Option<u64>) -> L1ActionRequest {
	let nonce = nonce.unwrap_or_else(current_timestamp_millis);
	let mut request = L1ActionRequest::new(action, nonce).with_chain(config.signer.network);
	if let Some(vault) = &config.signer.vault_address {
		request = request.with_vault_address(vault.clone());
	}
	if let Some(expires_after) = config.signer.expires_after(nonce) {
		request = request.with_expires_after(expires_after);
	}
	request
}

/// A user-signed action with its chain fields and nonce filled in.
#[derive(Debug)]
struct PreparedAction {
	action: ActionValue,
	kind: UserSignedKind,
	nonce: u64,
	chain_id: u64,
}

/// Sets `hyperliquidChain` from the configured network and fills the
/// `time`/`nonce` field when the action lacks one. An explicit
/// `signatureChainId` in the action wins over the configured one.
fn prepare_user_signed(
	config: &Config,
	action: ActionValue,
	nonce: Option<u64>,
) -> Result<PreparedAction, CommandError> {
	let kind = UserSignedKind::from_action(&action).ok_or_else(|| {
		CommandError::Input("'type' does not name a user-signed action".into())
	})?;
	let chain_id = match action.get("signatureChainId") {
		Some(_) => signature_chain_id(&action)?,
		None => config.signer.signature_chain_id(),
	};
	let ActionValue::Map(mut map) = action else {
		return Err(CommandError::Input("expected a JSON object".into()));
	};
	with_chain_fields(&mut map, config.signer.network, chain_id);

	let nonce_field = kind
		.fields()
		.iter()
		.map(|(name, _)| *name)
		.find(|name| *name == "time" || *name == "nonce");
	let nonce = match nonce_field {
		Some(field) => match map.get(field) {
			Some(ActionValue::Int(value)) => u64::try_from(*value)
				.map_err(|_| CommandError::Input(format!("negative {}: {}", field, value)))?,
			Some(other) => {
				return Err(CommandError::Input(format!(
					"{} must be an integer, got {}",
					field,
					other.kind()
				)));
			},
			None => {
				let value = nonce.unwrap_or_else(current_timestamp_millis);
				map.insert(field.to_string(), ActionValue::from(value));
				value
			},
		},
		None => nonce.unwrap_or_else(current_timestamp_millis),
	};

	Ok(PreparedAction {
		action: ActionValue::Map(map),
		kind,
		nonce,
		chain_id,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const K1: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";
	const K2: &str = "0xe908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";
	const MAINNET_SIG: &str = "0x08bd3567b8376d8e227fe2ec3ab237c08af799f0296150d49ec4391ee0c1585f4d1b70396f9b3d5b7f36503ff02cf5928bae9ba9d7d0716c8608fa04053238871c";
	const CANCEL: &str = r#"{"type": "cancel", "cancels": [{"a": 0, "o": 12345}]}"#;
	const MULTI_SIG_USER: &str = "0xABABABABABABABABABABABABABABABABABABABAB";
	const OUTER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	fn config(key: &str, signer: &str) -> Config {
		format!(
			"[signer]\n{}\n[wallet]\nprimary = \"local\"\n[wallet.implementations.local]\nprivate_key = \"{}\"\n",
			signer, key
		)
		.parse()
		.unwrap()
	}

	fn json_file(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[tokio::test]
	async fn test_hash_command() {
		let action = json_file(CANCEL);
		let output = run(
			Command::Hash {
				action: action.path().to_path_buf(),
				nonce: Some(1_234_567_890),
			},
			&config(K1, ""),
		)
		.await
		.unwrap();
		assert_eq!(
			output["actionHash"],
			"0xf46de1b741c98ad0bff9b3b6e0589c11b205125c06c1911bbc01f4556ff041a2"
		);
		assert_eq!(output["nonce"], 1_234_567_890u64);
	}

	#[tokio::test]
	async fn test_sign_l1_command() {
		let action = json_file(CANCEL);
		let output = run(
			Command::SignL1 {
				action: action.path().to_path_buf(),
				nonce: Some(1_234_567_890),
			},
			&config(K1, "network = \"mainnet\""),
		)
		.await
		.unwrap();

		let signature: Signature = serde_json::from_value(output["signature"].clone()).unwrap();
		assert_eq!(signature, Signature::split(MAINNET_SIG).unwrap());
		assert_eq!(output["action"]["type"], "cancel");
		assert!(output.get("vaultAddress").is_none());
	}

	#[tokio::test]
	async fn test_sign_l1_carries_context() {
		let action = json_file(CANCEL);
		let output = run(
			Command::SignL1 {
				action: action.path().to_path_buf(),
				nonce: Some(1_000),
			},
			&config(
				K1,
				"vault_address = \"0x1719884eb866cb12b2287399b15f7db5e7d775ea\"\nexpires_after_ms = 500",
			),
		)
		.await
		.unwrap();
		assert_eq!(output["vaultAddress"], "0x1719884eb866cb12b2287399b15f7db5e7d775ea");
		assert_eq!(output["expiresAfter"], 1_500);
	}

	#[tokio::test]
	async fn test_sign_user_command() {
		let action = json_file(
			r#"{"type": "usdSend", "signatureChainId": "0xa4b1", "destination": "0x0d1d9635d0640821d15e323ac8adadfa9c111414", "amount": "1", "time": 1690393044548}"#,
		);
		let output = run(
			Command::SignUser {
				action: action.path().to_path_buf(),
				nonce: None,
			},
			&config(K2, "network = \"mainnet\""),
		)
		.await
		.unwrap();

		let signature: Signature = serde_json::from_value(output["signature"].clone()).unwrap();
		assert_eq!(
			signature.to_string(),
			"0xeca6267bcaadc4c0ae1aed73f5a2c45fcdbb7271f2e9356992404e5d4bad75a3572e08fe93f17755abadb7f84be7d1e9c4ce48bb5633e339bc430c672d5a20ed1b"
		);
		assert_eq!(output["nonce"], 1690393044548u64);
		assert_eq!(output["action"]["hyperliquidChain"], "Mainnet");
	}

	#[test]
	fn test_prepare_fills_chain_and_time() {
		let action = ActionValue::from(json!({
			"type": "withdraw3",
			"destination": "0x0d1d9635d0640821d15e323ac8adadfa9c111414",
			"amount": "2"
		}));
		let prepared =
			prepare_user_signed(&config(K1, "network = \"testnet\""), action, Some(42)).unwrap();

		assert_eq!(prepared.kind, UserSignedKind::Withdraw);
		assert_eq!(prepared.chain_id, 0x66eee);
		assert_eq!(prepared.nonce, 42);
		assert_eq!(prepared.action.get("time"), Some(&ActionValue::Int(42)));
		assert_eq!(
			prepared.action.get("signatureChainId"),
			Some(&ActionValue::from("0x66eee"))
		);
		assert_eq!(
			prepared.action.get("hyperliquidChain"),
			Some(&ActionValue::from("Testnet"))
		);
	}

	#[test]
	fn test_prepare_rejects_l1_action() {
		let action = ActionValue::from(json!({"type": "cancel"}));
		assert!(matches!(
			prepare_user_signed(&config(K1, ""), action, None),
			Err(CommandError::Input(_))
		));
	}

	#[tokio::test]
	async fn test_multisig_part_dispatches_on_action_type() {
		let config = config(K1, "network = \"mainnet\"");

		let cancel = json_file(CANCEL);
		let output = run(
			Command::MultisigPart {
				action: cancel.path().to_path_buf(),
				multi_sig_user: MULTI_SIG_USER.into(),
				outer_signer: OUTER.into(),
				nonce: Some(1_234_567_890),
			},
			&config,
		)
		.await
		.unwrap();
		let signature: Signature = serde_json::from_value(output["signature"].clone()).unwrap();
		assert_eq!(
			signature.to_string(),
			"0x9bbfaa1283dcaf8e918ebb4d1978f5495ca4413cb0b9a9f4e3dc660dd570e2f31c6e8af4d8ad29c05b27bed5be8aca3a8e56077c7031501cd9df74b7adeef65f1b"
		);

		let usd_send = json_file(
			r#"{"type": "usdSend", "signatureChainId": "0x66eee", "hyperliquidChain": "Mainnet", "destination": "0x0d1d9635d0640821d15e323ac8adadfa9c111414", "amount": "1", "time": 1690393044548}"#,
		);
		let output = run(
			Command::MultisigPart {
				action: usd_send.path().to_path_buf(),
				multi_sig_user: MULTI_SIG_USER.into(),
				outer_signer: OUTER.into(),
				nonce: None,
			},
			&config,
		)
		.await
		.unwrap();
		let signature: Signature = serde_json::from_value(output["signature"].clone()).unwrap();
		assert_eq!(
			signature.to_string(),
			"0xc8d0364510f85d0a71ed73c192b273a0709f65c9f269cb221817db14518355a56fcc7fc66337ffdd04b0184aeed0d4f06e202c4347342ea07c3ff896a8ed49911c"
		);
	}

	#[tokio::test]
	async fn test_multisig_send_command() {
		let action = json_file(CANCEL);
		let signatures = json_file(
			r#"[{"r": "0x9bbfaa1283dcaf8e918ebb4d1978f5495ca4413cb0b9a9f4e3dc660dd570e2f3", "s": "0x1c6e8af4d8ad29c05b27bed5be8aca3a8e56077c7031501cd9df74b7adeef65f", "v": 27}]"#,
		);
		let output = run(
			Command::MultisigSend {
				action: action.path().to_path_buf(),
				signatures: signatures.path().to_path_buf(),
				multi_sig_user: MULTI_SIG_USER.into(),
				outer_signer: OUTER.into(),
				nonce: Some(1_234_567_890),
			},
			&config(K1, "network = \"testnet\""),
		)
		.await
		.unwrap();

		assert_eq!(output["action"]["type"], "multiSig");
		assert_eq!(output["action"]["signatureChainId"], "0x66eee");
		assert_eq!(output["action"]["signatures"].as_array().unwrap().len(), 1);
		assert_eq!(
			output["action"]["payload"]["multiSigUser"],
			"0xabababababababababababababababababababab"
		);
		assert!(serde_json::from_value::<Signature>(output["signature"].clone()).is_ok());
	}

	#[tokio::test]
	async fn test_missing_action_file() {
		let result = run(
			Command::Hash {
				action: PathBuf::from("/nonexistent/action.json"),
				nonce: None,
			},
			&config(K1, ""),
		)
		.await;
		assert!(matches!(result, Err(CommandError::Io(_))));
	}
}
