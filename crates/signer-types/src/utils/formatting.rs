//! String formatting utilities for hex values.

/// Truncates a hex string for log output.
///
/// Shows only the first 10 characters (enough for `0x` plus 4 bytes) followed by "..".
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		format!("0x{}", &hex_str[2..])
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Canonical lowercase `0x`-prefixed form of an address string.
///
/// Multi-sig envelopes embed addresses as strings, so the checksummed and
/// lowercase spellings of one address must hash identically.
pub fn lowercase_address(address: &str) -> String {
	with_0x_prefix(&without_0x_prefix(address).to_ascii_lowercase())
}
