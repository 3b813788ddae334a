// src/report/format.rs
//! Number and duration formatting shared by all reports
//!
//! Values are rounded to two decimals and printed with at least one
//! fractional digit, so `5` shows as `5.0` and `2.346` as `2.35`.

use std::time::Duration;

/// Hashes per second in one gigahash per second
pub const GIGA: f64 = 1e9;

/// Hashes per second in one megahash per second
pub const MEGA: f64 = 1e6;

/// Rounds to two decimal places, halves going to the even neighbour
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Renders a value rounded to two decimals with at least one fractional digit
pub fn decimal(value: f64) -> String {
    let rounded = round2(value);
    let text = rounded.to_string();
    if text.contains('.') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}

/// Converts a raw H/s figure into GH/s rounded to two decimals
pub fn to_gigahashes(hashes_per_second: f64) -> f64 {
    round2(hashes_per_second / GIGA)
}

/// Share of the network held by the pool, in percent
///
/// Returns `None` when the network figure is zero or not finite.
pub fn share_percentage(pool: f64, network: f64) -> Option<f64> {
    if network == 0.0 || !network.is_finite() || !pool.is_finite() {
        return None;
    }
    Some(round2(pool / network * 100.0))
}

/// Mean of a luck history as a percentage
///
/// Returns `None` for an empty history.
pub fn average_luck(ratios: &[f64]) -> Option<f64> {
    if ratios.is_empty() {
        return None;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    Some(round2(mean * 100.0))
}

/// Formats a duration as `HH:MM:SS`, dropping sub-second precision
///
/// Hours keep counting past 24.
pub fn elapsed(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(5.0, "5.0" ; "whole number gains a decimal")]
    #[test_case(2.346, "2.35" ; "rounds to two places")]
    #[test_case(100.0, "100.0" ; "hundred")]
    #[test_case(0.1 + 0.2, "0.3" ; "float noise is rounded away")]
    #[test_case(1234.5, "1234.5" ; "single decimal kept")]
    #[test_case(1.125, "1.12" ; "exact half rounds to even")]
    #[test_case(1.375, "1.38" ; "exact half rounds up to even")]
    fn test_decimal(value: f64, expected: &str) {
        assert_eq!(decimal(value), expected);
    }

    #[test]
    fn test_network_hashrate_conversion() {
        let raw: f64 = "5000000000".parse().unwrap();
        assert_eq!(decimal(to_gigahashes(raw)), "5.0");
    }

    #[test]
    fn test_share_percentage() {
        assert_eq!(share_percentage(2.5, 5.0), Some(50.0));
        assert_eq!(share_percentage(1.0, 3.0), Some(33.33));
        assert_eq!(share_percentage(2.5, 0.0), None, "zero network rate must be guarded");
    }

    #[test]
    fn test_average_luck() {
        assert_eq!(average_luck(&[0.8, 1.2, 1.0]).map(decimal).as_deref(), Some("100.0"));
        assert_eq!(average_luck(&[0.5]), Some(50.0));
        assert_eq!(average_luck(&[]), None);
    }

    #[test]
    fn test_elapsed_truncates_subseconds() {
        assert_eq!(elapsed(Duration::from_millis(3_725_999)), "01:02:05");
        assert_eq!(elapsed(Duration::ZERO), "00:00:00");
        assert_eq!(elapsed(Duration::from_secs(26 * 3600 + 61)), "26:01:01");
    }
}
