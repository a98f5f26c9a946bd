//! Wallet capability detection.
//!
//! Detection looks only at method names and declared arities, so any object
//! that exposes the right shape is accepted regardless of where it came from.

use std::fmt;

use crate::{WalletError, WalletObject};

/// Method name shared by viem and ethers v6 signers.
pub const SIGN_TYPED_DATA: &str = "signTypedData";
/// Method name used by ethers v5 signers.
pub const SIGN_TYPED_DATA_V5: &str = "_signTypedData";
/// EIP-1193 provider entry point.
pub const REQUEST: &str = "request";

/// The five calling conventions a wallet can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletKind {
	/// `signTypedData({domain, types, primaryType, message})`
	Viem,
	/// `signTypedData(typedData, options)`
	ExtendedViem,
	/// `signTypedData(domain, types, message)`
	Ethers,
	/// `_signTypedData(domain, types, message)`
	EthersV5,
	/// `request({method, params})`
	WindowProvider,
}

impl fmt::Display for WalletKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			WalletKind::Viem => "viem",
			WalletKind::ExtendedViem => "extended-viem",
			WalletKind::Ethers => "ethers",
			WalletKind::EthersV5 => "ethers-v5",
			WalletKind::WindowProvider => "window-provider",
		};
		f.write_str(name)
	}
}

/// Determines which calling convention `wallet` implements.
///
/// Returns `None` when no shape matches; detection itself never fails.
pub fn detect(wallet: &dyn WalletObject) -> Option<WalletKind> {
	if let Some(method) = wallet.method(SIGN_TYPED_DATA) {
		match method.arity() {
			1 => return Some(WalletKind::Viem),
			2 => return Some(WalletKind::ExtendedViem),
			3 => return Some(WalletKind::Ethers),
			_ => {},
		}
	}
	if wallet
		.method(SIGN_TYPED_DATA_V5)
		.is_some_and(|method| method.arity() == 3)
	{
		return Some(WalletKind::EthersV5);
	}
	if wallet
		.method(REQUEST)
		.is_some_and(|method| method.arity() >= 1)
	{
		return Some(WalletKind::WindowProvider);
	}
	None
}

/// A wallet borrowed for one signing call, together with its detected kind.
#[derive(Clone, Copy)]
pub struct AbstractWallet<'a> {
	pub kind: WalletKind,
	pub object: &'a dyn WalletObject,
}

impl<'a> AbstractWallet<'a> {
	/// Detects the wallet's kind, failing with
	/// [`WalletError::UnsupportedWallet`] when nothing matches.
	pub fn new(object: &'a dyn WalletObject) -> Result<Self, WalletError> {
		let kind = detect(object).ok_or(WalletError::UnsupportedWallet)?;
		tracing::debug!(kind = %kind, "Detected wallet");
		Ok(Self { kind, object })
	}
}

impl fmt::Debug for AbstractWallet<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AbstractWallet")
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}
