//! Helper utilities for common operations.

/// Current UNIX time in milliseconds, or 0 if the system clock is before the epoch.
///
/// This is the conventional nonce for exchange actions.
pub fn current_timestamp_millis() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_timestamp_is_milliseconds() {
		// 2020-09-13 in milliseconds; seconds would be three orders smaller.
		assert!(current_timestamp_millis() > 1_600_000_000_000);
	}
}
