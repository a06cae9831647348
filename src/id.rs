//! ID generation utilities for Cadencer
//!
//! Provides functions for generating unique identifiers for clients,
//! locations, questions, and content items.

use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

static LAST_MS: AtomicI64 = AtomicI64::new(0);

/// Strictly increasing millisecond timestamp.
///
/// Used where records are ordered by the timestamp and same-millisecond
/// writes must not tie, e.g. slot-assignment order.
pub fn monotonic_ms() -> i64 {
    let mut candidate = now_ms();
    loop {
        let last = LAST_MS.load(Ordering::SeqCst);
        if candidate <= last {
            candidate = last + 1;
        }
        if LAST_MS
            .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return candidate;
        }
    }
}

/// Generate a unique record ID with the given prefix
///
/// Format: `{prefix}-{timestamp_ms}-{random_hex}`
/// Example: `item-1738300800123-a1b2`
pub fn generate_id(prefix: &str) -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("{}-{}-{:04x}", prefix, timestamp, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_returns_reasonable_timestamp() {
        let ts = now_ms();
        // Should be after 2020-01-01 and before 2100-01-01
        assert!(ts > 1577836800000);
        assert!(ts < 4102444800000);
    }

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("item");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "item");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_id_uniqueness() {
        let id1 = generate_id("client");
        let id2 = generate_id("client");
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_monotonic_ms_strictly_increases() {
        let a = monotonic_ms();
        let b = monotonic_ms();
        let c = monotonic_ms();
        assert!(a < b);
        assert!(b < c);
    }
}
