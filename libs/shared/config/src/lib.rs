use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub hold_window_minutes: i64,
    pub scan_interval_seconds: u64,
    pub default_slot_duration_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_env("PORT", 3000),
            hold_window_minutes: parse_env("HOLD_WINDOW_MINUTES", 5),
            scan_interval_seconds: parse_env("SCAN_INTERVAL_SECONDS", 60),
            default_slot_duration_minutes: parse_env("DEFAULT_SLOT_DURATION_MINUTES", 45),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            hold_window_minutes: 5,
            scan_interval_seconds: 60,
            default_slot_duration_minutes: 45,
        }
    }
}

fn parse_env<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("{} has unparseable value {:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_booking_policy() {
        let config = AppConfig::default();
        assert_eq!(config.hold_window_minutes, 5);
        assert_eq!(config.scan_interval_seconds, 60);
        assert_eq!(config.default_slot_duration_minutes, 45);
    }
}
