use chrono::NaiveTime;
use serde::Deserialize;
use std::time::Duration;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    pub broadcast_scheduler: BroadcastSchedulerConfig,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastSchedulerConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    #[serde(default)]
    pub start_time: Option<String>, // UTC, "HH:MM:SS"
    #[serde(default)]
    pub end_time: Option<String>, // UTC, "HH:MM:SS"
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub timeout: u64,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
}

/// Outbound HTTP settings shared by the rate providers and Telegram.
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

#[derive(Debug, Deserialize)]
pub struct RatesConfig {
    pub fiat_base_url: String,
    pub crypto_url: String,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            fiat_base_url: "https://v6.exchangerate-api.com/v6".to_string(),
            crypto_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
        }
    }
}

impl BroadcastSchedulerConfig {
    /// Checks if the current time is within the allowed operation window
    pub fn is_operation_allowed(&self) -> bool {
        self.is_operation_allowed_at(chrono::Utc::now().time())
    }

    pub fn is_operation_allowed_at(&self, now: NaiveTime) -> bool {
        // If no time window is configured (or it does not parse), always allow operation
        let Some((start, end)) = self.window() else {
            return true;
        };

        if start <= end {
            start <= now && now <= end
        } else {
            // Window crosses midnight, e.g. start=21:00:00, end=04:00:00
            start <= now || now <= end
        }
    }

    /// Delay before the first tick.
    ///
    /// Normally one full period. When startup falls outside the window the
    /// first tick is moved to the next window start, so a daily interval keeps
    /// landing inside the window.
    pub fn first_tick_delay(&self, now: NaiveTime, period: Duration) -> Duration {
        let Some((start, _)) = self.window() else {
            return period;
        };
        if self.is_operation_allowed_at(now) {
            return period;
        }

        let until_start = (start - now).num_seconds().rem_euclid(SECONDS_PER_DAY);
        Duration::from_secs(until_start as u64)
    }

    fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        let (Some(start), Some(end)) = (&self.start_time, &self.end_time) else {
            return None;
        };

        match (
            NaiveTime::parse_from_str(start, "%H:%M:%S"),
            NaiveTime::parse_from_str(end, "%H:%M:%S"),
        ) {
            (Ok(start), Ok(end)) => Some((start, end)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: Option<&str>, end: Option<&str>) -> BroadcastSchedulerConfig {
        BroadcastSchedulerConfig {
            enabled: true,
            interval_seconds: 86400,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_no_window_always_allowed() {
        assert!(window(None, None).is_operation_allowed_at(at(3, 0)));
        assert!(window(Some("09:00:00"), None).is_operation_allowed_at(at(3, 0)));
    }

    #[test]
    fn test_simple_window() {
        let config = window(Some("04:00:00"), Some("06:00:00"));
        assert!(config.is_operation_allowed_at(at(5, 0)));
        assert!(!config.is_operation_allowed_at(at(7, 0)));
    }

    #[test]
    fn test_window_crossing_midnight() {
        let config = window(Some("21:00:00"), Some("04:00:00"));
        assert!(config.is_operation_allowed_at(at(23, 30)));
        assert!(config.is_operation_allowed_at(at(1, 0)));
        assert!(!config.is_operation_allowed_at(at(12, 0)));
    }

    #[test]
    fn test_unparsable_window_allows() {
        assert!(window(Some("soon"), Some("later")).is_operation_allowed_at(at(12, 0)));
    }

    #[test]
    fn test_first_tick_inside_window_waits_one_period() {
        let day = Duration::from_secs(86400);
        assert_eq!(window(None, None).first_tick_delay(at(12, 0), day), day);
        assert_eq!(
            window(Some("04:00:00"), Some("06:00:00")).first_tick_delay(at(5, 0), day),
            day
        );
    }

    #[test]
    fn test_first_tick_outside_window_aligns_to_start() {
        let day = Duration::from_secs(86400);
        let config = window(Some("04:00:00"), Some("06:00:00"));

        // Later the same day
        assert_eq!(config.first_tick_delay(at(3, 30), day), Duration::from_secs(30 * 60));
        // Start has passed today, so tomorrow
        assert_eq!(config.first_tick_delay(at(7, 0), day), Duration::from_secs(21 * 3600));

        // Every following daily tick lands at 04:00, inside the window
        let first = at(7, 0) + chrono::Duration::seconds(21 * 3600);
        assert_eq!(first, at(4, 0));
        assert!(config.is_operation_allowed_at(first));
    }

    #[test]
    fn test_first_tick_outside_midnight_window() {
        let config = window(Some("21:00:00"), Some("04:00:00"));
        assert_eq!(
            config.first_tick_delay(at(12, 0), Duration::from_secs(3600)),
            Duration::from_secs(9 * 3600)
        );
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let raw = r#"
            [log]
            level = "info"
            format = "json"

            [postgres]
            timeout = 5
            max_connections = 10
            min_connections = 1
            max_lifetime = 1800
            idle_timeout = 600

            [broadcast_scheduler]
            enabled = true
            interval_seconds = 86400
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.http.timeout_seconds, 10);
        assert!(config.rates.fiat_base_url.starts_with("https://v6.exchangerate-api.com"));
        assert!(config.broadcast_scheduler.start_time.is_none());
    }
}
