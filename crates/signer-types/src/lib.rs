//! Common types for the exchange signer.
//!
//! This crate holds the data shapes every other signer crate agrees on: the
//! action value tree, EIP-712 typed-data pieces, the split signature and the
//! environment selector.

/// Exchange environments (mainnet / testnet).
pub mod chain;
/// EIP-712 domain, type and payload structures.
pub mod eip712;
/// Registry trait for config-built implementations.
pub mod registry;
/// Redacting secret wrapper.
pub mod secret_string;
/// Split `{r, s, v}` signatures.
pub mod signature;
/// Utility functions for hex formatting and timestamps.
pub mod utils;
/// Schema checks for implementation config tables.
pub mod validation;
/// Ordered action value tree.
pub mod value;

pub use alloy_primitives::{Address, B256};
pub use chain::{Chain, MAINNET_SIGNATURE_CHAIN_ID, TESTNET_SIGNATURE_CHAIN_ID};
pub use eip712::{
	eip712_domain_fields, primary_type, single_type, with_domain_type, TypedDataDomain,
	TypedDataField, TypedDataPayload, TypedDataTypes, EIP712_DOMAIN_TYPE,
};
pub use num_bigint::BigInt;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use signature::{Signature, SignatureError, SIGNATURE_LENGTH};
pub use utils::{
	current_timestamp_millis, lowercase_address, truncate_id, with_0x_prefix, without_0x_prefix,
};
pub use validation::{ConfigSchema, Field, FieldType, Schema, ValidationError};
pub use value::{ActionMap, ActionValue, MAX_SAFE_INTEGER};
