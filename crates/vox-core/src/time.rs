//! Wall-clock time helpers.

use chrono::Utc;

/// Current wall-clock time as epoch milliseconds.
///
/// All presence and activity timestamps use this representation so they
/// serialize directly into the wire format.
pub fn epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_ms_is_nonzero_and_monotonic_enough() {
        let a = epoch_ms();
        let b = epoch_ms();
        assert!(a > 1_600_000_000_000, "expected a post-2020 timestamp");
        assert!(b >= a);
    }
}
