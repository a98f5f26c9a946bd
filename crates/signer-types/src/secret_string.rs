//! Redacting wrapper for private keys and other secrets.
//!
//! Wallet configuration carries raw private keys. `SecretString` zeroes its
//! buffer on drop and never prints the value, so a config dump or a
//! `tracing` field cannot leak the key.

use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// A string that is zeroed on drop and redacted in `Debug` and `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Runs `f` with the secret, limiting where it is visible.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}
