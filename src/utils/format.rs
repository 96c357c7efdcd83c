// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/format.rs
// Version: 1.0.0
//
// This file provides utility functions for formatting statistics in the
// stratum miner, located in the utils subdirectory. It formats hashrate,
// difficulty and uptime for consistent output in logs.
//
// Tree Location:
// - src/utils/format.rs (formatting utilities)
// - Depends on: std

use std::time::Duration;

/// Utility functions for formatting miner statistics
pub struct FormatUtils;

impl FormatUtils {
    /// Format hashrate in appropriate units (H/s, KH/s, MH/s, GH/s)
    pub fn format_hashrate(hashrate: f64) -> String {
        if hashrate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", hashrate / 1_000_000_000.0)
        } else if hashrate >= 1_000_000.0 {
            format!("{:.2} MH/s", hashrate / 1_000_000.0)
        } else if hashrate >= 1_000.0 {
            format!("{:.2} KH/s", hashrate / 1_000.0)
        } else {
            format!("{:.0} H/s", hashrate)
        }
    }

    /// Format a difficulty with K/M/G/T suffixes
    pub fn format_difficulty(difficulty: u64) -> String {
        const UNITS: [(u64, &str); 4] = [
            (1_000_000_000_000, "T"),
            (1_000_000_000, "G"),
            (1_000_000, "M"),
            (1_000, "K"),
        ];
        UNITS
            .iter()
            .find(|(scale, _)| difficulty >= *scale)
            .map(|(scale, unit)| format!("{:.1}{}", difficulty as f64 / *scale as f64, unit))
            .unwrap_or_else(|| difficulty.to_string())
    }

    /// Format an uptime as `1h 02m 03s`
    pub fn format_uptime(duration: Duration) -> String {
        let secs = duration.as_secs();
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if hours > 0 {
            format!("{}h {:02}m {:02}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {:02}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hashrate() {
        assert_eq!(FormatUtils::format_hashrate(512.0), "512 H/s");
        assert_eq!(FormatUtils::format_hashrate(1_500.0), "1.50 KH/s");
        assert_eq!(FormatUtils::format_hashrate(2_250_000.0), "2.25 MH/s");
        assert_eq!(FormatUtils::format_hashrate(3_000_000_000.0), "3.00 GH/s");
    }

    #[test]
    fn test_format_difficulty() {
        assert_eq!(FormatUtils::format_difficulty(999), "999");
        assert_eq!(FormatUtils::format_difficulty(15_000), "15.0K");
        assert_eq!(FormatUtils::format_difficulty(9_223_372_036_854_775_807), "9223372.0T");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(FormatUtils::format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(FormatUtils::format_uptime(Duration::from_secs(65)), "1m 05s");
        assert_eq!(FormatUtils::format_uptime(Duration::from_secs(3723)), "1h 02m 03s");
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - Added difficulty and uptime formatting for the periodic summary.
//   - Dropped the relative "ago" duration formatting.
