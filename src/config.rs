use std::path::PathBuf;
use std::time::Duration;

use time::UtcOffset;

use crate::engine::EngineConfig;

/// Overdue equipment stays on the daemon's radar for this long after its
/// return date.
pub const DEFAULT_OVERDUE_LOOKBACK_DAYS: u32 = 7;

/// Process configuration, read from `RENTWATCH_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub metrics_port: Option<u16>,
    pub sweep_interval: Duration,
    pub utc_offset: UtcOffset,
    pub overdue_lookback_days: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or unparsable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<i64>().ok());

        let snapshot_path: PathBuf = lookup("RENTWATCH_SNAPSHOT")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "./data/bookings.json".into())
            .into();
        let metrics_port = parsed("RENTWATCH_METRICS_PORT").and_then(|p| u16::try_from(p).ok());
        let sweep_secs = parsed("RENTWATCH_SWEEP_INTERVAL_SECS")
            .and_then(|s| u64::try_from(s).ok())
            .filter(|s| *s > 0)
            .unwrap_or(60);
        let utc_offset = parsed("RENTWATCH_UTC_OFFSET_HOURS")
            .and_then(|h| i8::try_from(h).ok())
            .and_then(|h| UtcOffset::from_hms(h, 0, 0).ok())
            .unwrap_or(UtcOffset::UTC);
        let overdue_lookback_days = parsed("RENTWATCH_OVERDUE_LOOKBACK_DAYS")
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(DEFAULT_OVERDUE_LOOKBACK_DAYS);

        Self {
            snapshot_path,
            metrics_port,
            sweep_interval: Duration::from_secs(sweep_secs),
            utc_offset,
            overdue_lookback_days,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            overdue_lookback_days: self.overdue_lookback_days,
            reference_offset: self.utc_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.snapshot_path, PathBuf::from("./data/bookings.json"));
        assert_eq!(c.metrics_port, None);
        assert_eq!(c.sweep_interval, Duration::from_secs(60));
        assert_eq!(c.utc_offset, UtcOffset::UTC);
        assert_eq!(c.overdue_lookback_days, DEFAULT_OVERDUE_LOOKBACK_DAYS);
        assert!(c.engine_config().overdue_lookback_days > 0);
    }

    #[test]
    fn reads_overrides() {
        let c = config(&[
            ("RENTWATCH_SNAPSHOT", "/srv/export.json"),
            ("RENTWATCH_METRICS_PORT", "9100"),
            ("RENTWATCH_SWEEP_INTERVAL_SECS", "5"),
            ("RENTWATCH_UTC_OFFSET_HOURS", "-5"),
            ("RENTWATCH_OVERDUE_LOOKBACK_DAYS", "14"),
        ]);
        assert_eq!(c.snapshot_path, PathBuf::from("/srv/export.json"));
        assert_eq!(c.metrics_port, Some(9100));
        assert_eq!(c.sweep_interval, Duration::from_secs(5));
        assert_eq!(c.utc_offset.whole_hours(), -5);
        let engine = c.engine_config();
        assert_eq!(engine.overdue_lookback_days, 14);
        assert_eq!(engine.reference_offset, c.utc_offset);
    }

    #[test]
    fn bad_values_fall_back() {
        let c = config(&[
            ("RENTWATCH_METRICS_PORT", "70000"),
            ("RENTWATCH_SWEEP_INTERVAL_SECS", "0"),
            ("RENTWATCH_UTC_OFFSET_HOURS", "30"),
            ("RENTWATCH_OVERDUE_LOOKBACK_DAYS", "-1"),
        ]);
        assert_eq!(c.metrics_port, None);
        assert_eq!(c.sweep_interval, Duration::from_secs(60));
        assert_eq!(c.utc_offset, UtcOffset::UTC);
        assert_eq!(c.overdue_lookback_days, DEFAULT_OVERDUE_LOOKBACK_DAYS);
    }

    #[test]
    fn lookback_can_be_disabled() {
        let c = config(&[("RENTWATCH_OVERDUE_LOOKBACK_DAYS", "0")]);
        assert_eq!(c.overdue_lookback_days, 0);
    }
}
