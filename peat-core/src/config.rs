use serde::{Deserialize, Serialize};

/// Timestamp format of the input CSV files: "YYYY-MM-DD HH:MM:SS"
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time zone applied to input timestamps when none is configured.
pub const DEFAULT_TIME_ZONE: &str = "Africa/Lagos";

/// Settings for one load run.
///
/// Missing fields fall back to [`TIMESTAMP_FORMAT`] and [`DEFAULT_TIME_ZONE`]
/// when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// IANA name of the zone the local input timestamps were recorded in.
    pub time_zone: String,
    /// chrono format string for the timestamp column.
    pub timestamp_format: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl LoadConfig {
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_lagos_and_iso_format() {
        let config = LoadConfig::default();
        assert_eq!(config.time_zone, "Africa/Lagos");
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LoadConfig = serde_json::from_str(r#"{"time_zone": "UTC"}"#).unwrap();
        assert_eq!(config.time_zone, "UTC");
        assert_eq!(config.timestamp_format, TIMESTAMP_FORMAT);
    }

    #[test]
    fn with_time_zone_overrides_zone_only() {
        let config = LoadConfig::default().with_time_zone("Europe/Helsinki");
        assert_eq!(config.time_zone, "Europe/Helsinki");
        assert_eq!(config.timestamp_format, TIMESTAMP_FORMAT);
    }
}
