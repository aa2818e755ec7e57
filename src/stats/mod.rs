//! Throughput and latency arithmetic
//!
//! Every value reported by the API passes through these helpers, so the
//! formulas and the 2-decimal rounding live in exactly one place.

use std::time::Duration;

/// Bits in a byte
const BITS_PER_BYTE: f64 = 8.0;
/// Bits in a megabit (decimal)
const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// Round to 2 decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Megabits per second for `bytes` transferred over `elapsed_secs`.
///
/// A non-positive or non-finite elapsed time yields 0.
pub fn mbps(bytes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 || !elapsed_secs.is_finite() {
        return 0.0;
    }
    (bytes as f64 * BITS_PER_BYTE) / (elapsed_secs * BITS_PER_MEGABIT)
}

/// Rounded megabits per second for a transfer of `bytes` taking `elapsed`
pub fn speed_mbps(bytes: u64, elapsed: Duration) -> f64 {
    round2(mbps(bytes, elapsed.as_secs_f64()))
}

/// Duration in milliseconds, unrounded
pub fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

/// Rounded milliseconds for `elapsed`
pub fn elapsed_ms(elapsed: Duration) -> f64 {
    round2(duration_ms(elapsed))
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Absolute differences between each consecutive pair of samples
pub fn consecutive_diffs(samples: &[f64]) -> Vec<f64> {
    samples.windows(2).map(|pair| (pair[1] - pair[0]).abs()).collect()
}

/// Mean absolute difference between consecutive samples, 0 with fewer than two
pub fn jitter(samples: &[f64]) -> f64 {
    mean(&consecutive_diffs(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(-2.345_6), -2.35);
    }

    #[test]
    fn test_mbps_one_megabyte_per_second() {
        // 1,000,000 bytes in 1s is 8 Mbps
        assert_eq!(speed_mbps(1_000_000, Duration::from_secs(1)), 8.0);
        assert_eq!(speed_mbps(1_000_000, Duration::from_millis(500)), 16.0);
    }

    #[test]
    fn test_mbps_zero_bytes() {
        assert_eq!(speed_mbps(0, Duration::from_millis(12)), 0.0);
    }

    #[test]
    fn test_mbps_zero_elapsed() {
        assert_eq!(speed_mbps(1_000, Duration::ZERO), 0.0);
        assert_eq!(mbps(1_000, f64::NAN), 0.0);
    }

    #[test]
    fn test_elapsed_ms() {
        assert_eq!(elapsed_ms(Duration::from_micros(12_345)), 12.35);
        assert_eq!(elapsed_ms(Duration::from_secs(2)), 2000.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
    }

    #[test]
    fn test_jitter_single_sample_is_zero() {
        assert_eq!(jitter(&[42.0]), 0.0);
        assert_eq!(jitter(&[]), 0.0);
    }

    #[test]
    fn test_jitter_mean_of_abs_diffs() {
        // diffs: 10, 20 -> mean 15
        assert_eq!(jitter(&[10.0, 20.0, 0.0]), 15.0);
        assert_eq!(jitter(&[5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    proptest! {
        #[test]
        fn prop_speed_matches_formula(bytes in 0u64..10_000_000_000, micros in 1u64..600_000_000) {
            let elapsed = Duration::from_micros(micros);
            let t = elapsed.as_secs_f64();
            let expected = ((bytes as f64 * 8.0) / (t * 1_000_000.0) * 100.0).round() / 100.0;
            prop_assert_eq!(speed_mbps(bytes, elapsed), expected);
        }

        #[test]
        fn prop_diff_count_is_one_less(samples in proptest::collection::vec(0.0f64..5000.0, 1..50)) {
            prop_assert_eq!(consecutive_diffs(&samples).len(), samples.len() - 1);
        }

        #[test]
        fn prop_jitter_non_negative(samples in proptest::collection::vec(0.0f64..5000.0, 0..50)) {
            prop_assert!(jitter(&samples) >= 0.0);
        }

        #[test]
        fn prop_round2_has_two_decimals(value in 0.0f64..1_000_000.0) {
            let rounded = round2(value);
            prop_assert!((rounded * 100.0 - (rounded * 100.0).round()).abs() < 1e-6);
        }
    }
}
