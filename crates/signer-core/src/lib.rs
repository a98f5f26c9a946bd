//! Action signing for the exchange.
//!
//! Two entry points turn an action into an `{r, s, v}` signature:
//! - [`sign_l1_action`] hashes the action with its nonce and context and signs
//!   the hash inside an `Agent` message under the fixed `Exchange` domain.
//! - [`sign_user_signed_action`] signs the action itself as an EIP-712 message
//!   under the `HyperliquidSignTransaction` domain.
//!
//! The [`multisig`] module builds the envelopes co-signers sign and the final
//! `multiSig` action the outer signer submits.

use signer_encoding::{EncodingError, HashError};
use signer_types::SignatureError;
use signer_wallet::WalletError;
use thiserror::Error;

pub mod exchange;
pub mod multisig;
pub mod request;
pub mod user_signed;

pub use exchange::{agent_message, agent_types, l1_domain, sign_l1_action, L1ActionRequest};
pub use multisig::{
	l1_envelope, sign_l1_multi_sig_part, sign_multi_sig_action, sign_user_signed_multi_sig_part,
	user_signed_envelope, MultiSigAction, MultiSigPayload,
};
pub use request::ExchangeRequest;
pub use user_signed::{
	sign_user_signed_action, signature_chain_id, user_signed_domain, user_signed_message,
	with_chain_fields, UserSignedKind,
};

/// Errors that can occur while signing an action.
///
/// Lower-layer errors pass through with their own message.
#[derive(Debug, Error)]
pub enum SigningError {
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	#[error(transparent)]
	Hash(#[from] HashError),
	#[error(transparent)]
	Wallet(#[from] WalletError),
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// The action lacks a field the signing scheme needs.
	#[error("Invalid action: {0}")]
	InvalidAction(String),
}
