//! Exchange environments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signature chain id used by user-signed actions on mainnet (Arbitrum One).
pub const MAINNET_SIGNATURE_CHAIN_ID: u64 = 0xa4b1;
/// Signature chain id used by user-signed actions on testnet (Arbitrum Sepolia).
pub const TESTNET_SIGNATURE_CHAIN_ID: u64 = 0x66eee;

/// Production or test environment of the exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
	#[default]
	Mainnet,
	Testnet,
}

impl Chain {
	/// Value of the `source` field in L1 `Agent` messages.
	pub fn source(&self) -> &'static str {
		match self {
			Chain::Mainnet => "a",
			Chain::Testnet => "b",
		}
	}

	/// Value of the `hyperliquidChain` field in user-signed messages.
	pub fn hyperliquid_chain(&self) -> &'static str {
		match self {
			Chain::Mainnet => "Mainnet",
			Chain::Testnet => "Testnet",
		}
	}

	/// Default `signatureChainId` for user-signed actions.
	pub fn default_signature_chain_id(&self) -> u64 {
		match self {
			Chain::Mainnet => MAINNET_SIGNATURE_CHAIN_ID,
			Chain::Testnet => TESTNET_SIGNATURE_CHAIN_ID,
		}
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.hyperliquid_chain())
	}
}

impl FromStr for Chain {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"mainnet" => Ok(Chain::Mainnet),
			"testnet" => Ok(Chain::Testnet),
			other => Err(format!("Unknown network '{}'", other)),
		}
	}
}
