//! Small helpers shared by the signer crates.

pub mod formatting;
pub mod helpers;

pub use formatting::{lowercase_address, truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp_millis;
