//! Timestamp helpers for heartbeat lines.
//!
//! Shadow prints wall-clock and simulated timestamps as `H:MM:SS.sss` where
//! the hour field grows without wrapping. Both helpers are pure functions.

use anyhow::{anyhow, Context, Result};

/// Convert a `H:MM:SS.sss` timestamp into elapsed seconds
/// (`h*3600 + m*60 + s`).
pub fn timestamp_to_seconds(stamp: &str) -> Result<f64> {
    let mut parts = stamp.split(':');
    let (h, m, s) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s)) => (h, m, s),
        _ => return Err(anyhow!("malformed timestamp '{}'", stamp)),
    };

    let h: i64 = h
        .parse()
        .with_context(|| format!("bad hour field in timestamp '{}'", stamp))?;
    let m: i64 = m
        .parse()
        .with_context(|| format!("bad minute field in timestamp '{}'", stamp))?;
    let s: f64 = s
        .parse()
        .with_context(|| format!("bad second field in timestamp '{}'", stamp))?;

    Ok(h as f64 * 3600.0 + m as f64 * 60.0 + s)
}

/// Truncate fractional simulated seconds to the integer second key used
/// throughout the aggregate maps.
pub fn sim_second(seconds: f64) -> u64 {
    seconds as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_basic() {
        assert_eq!(timestamp_to_seconds("0:00:00.000").unwrap(), 0.0);
        assert_eq!(timestamp_to_seconds("00:00:05.100").unwrap(), 5.1);
        assert_eq!(timestamp_to_seconds("1:02:03.500").unwrap(), 3723.5);
    }

    #[test]
    fn test_timestamp_large_hours() {
        // Hours do not wrap at 24
        assert_eq!(timestamp_to_seconds("48:00:00.000").unwrap(), 172800.0);
    }

    #[test]
    fn test_timestamp_malformed() {
        assert!(timestamp_to_seconds("").is_err());
        assert!(timestamp_to_seconds("12:34").is_err());
        assert!(timestamp_to_seconds("aa:bb:cc").is_err());
    }

    #[test]
    fn test_sim_second_truncates() {
        assert_eq!(sim_second(0.0), 0);
        assert_eq!(sim_second(2.999), 2);
        assert_eq!(sim_second(3.0), 3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_roundtrip_whole_components(h in 0i64..10_000, m in 0i64..60, s in 0i64..60) {
                let stamp = format!("{:02}:{:02}:{:02}.000", h, m, s);
                let seconds = timestamp_to_seconds(&stamp).unwrap();
                prop_assert_eq!(seconds, (h * 3600 + m * 60 + s) as f64);
            }

            #[test]
            fn prop_sim_second_floors(seconds in 0.0f64..1e9) {
                let second = sim_second(seconds);
                prop_assert!(second as f64 <= seconds);
                prop_assert!(seconds < (second + 1) as f64);
            }
        }
    }
}
