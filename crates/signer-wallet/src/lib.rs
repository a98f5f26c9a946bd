//! Wallet abstraction for the exchange signer.
//!
//! Wallets come from many libraries and are recognised by shape: which signing
//! method they expose and how many arguments it declares. This crate models a
//! wallet as a [`WalletObject`] (a bag of named [`WalletMethod`]s), detects
//! which of the five supported calling conventions it follows, and drives the
//! matching EIP-712 signing call.

use async_trait::async_trait;
use signer_types::ImplementationRegistry;
use thiserror::Error;

pub mod detect;
pub mod eip712;
pub mod typed_data;

/// Re-export implementations
pub mod implementations {
	pub mod local;
	pub mod table;
}

pub use detect::{detect, AbstractWallet, WalletKind};
pub use typed_data::{sign_typed_data, CallPath, CallingConvention};

/// Error raised by a wallet backend, passed through untouched.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while talking to a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
	/// The object matches none of the supported wallet shapes.
	#[error("Unsupported wallet: expected signTypedData, _signTypedData or request")]
	UnsupportedWallet,
	/// A request-style provider returned an empty account list.
	#[error("No accounts returned by the wallet provider")]
	NoAccounts,
	/// The wallet answered with something that is not what was asked for.
	#[error("Invalid wallet response: {0}")]
	InvalidResponse(String),
	/// The typed data handed to the wallet is malformed.
	#[error("Invalid typed data: {0}")]
	InvalidTypedData(String),
	/// A configured private key could not be parsed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The wallet configuration table is malformed or names no known backend.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Error raised by the wallet itself (user rejection, RPC failure).
	#[error(transparent)]
	Provider(ProviderError),
}

/// A callable method of a wallet object.
///
/// `arity` is the declared parameter count used for detection; `call` receives
/// the positional arguments as JSON values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletMethod: Send + Sync {
	fn arity(&self) -> usize;

	async fn call(&self, args: Vec<serde_json::Value>) -> Result<serde_json::Value, ProviderError>;
}

/// An opaque wallet exposing methods by name.
pub trait WalletObject: Send + Sync {
	/// Looks up a method by its name, `None` when the wallet lacks it.
	fn method(&self, name: &str) -> Option<&dyn WalletMethod>;
}

/// Type alias for wallet factory functions.
pub type WalletFactory = fn(&toml::Value) -> Result<Box<dyn WalletObject>, WalletError>;

/// Registry trait for wallet implementations that can be built from config.
pub trait WalletRegistry: ImplementationRegistry<Factory = WalletFactory> {}

/// Get all registered wallet implementations.
///
/// Returns `(name, factory)` pairs; the name matches the key under
/// `[wallet.implementations]`.
pub fn get_all_implementations() -> Vec<(&'static str, WalletFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Owns a configured wallet and signs typed data with it.
pub struct WalletService {
	implementation: Box<dyn WalletObject>,
}

impl WalletService {
	pub fn new(implementation: Box<dyn WalletObject>) -> Self {
		Self { implementation }
	}

	/// Builds the wallet named `name` from its configuration table.
	pub fn from_config(name: &str, config: &toml::Value) -> Result<Self, WalletError> {
		let factory = get_all_implementations()
			.into_iter()
			.find(|(registered, _)| *registered == name)
			.map(|(_, factory)| factory)
			.ok_or_else(|| {
				WalletError::Configuration(format!("Unknown wallet implementation '{}'", name))
			})?;
		factory(config).map(Self::new)
	}

	/// The wrapped wallet object, for the signing façades.
	pub fn wallet(&self) -> &dyn WalletObject {
		self.implementation.as_ref()
	}

	/// The calling convention the wrapped wallet follows, if any.
	pub fn kind(&self) -> Option<WalletKind> {
		detect(self.wallet())
	}
}
