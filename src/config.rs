use crate::constants::defaults;
use crate::error::{Result, SeatLockError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SeatLockConfig {
    pub database_url: String,
    pub amqp_url: String,
    pub exchange_name: String,
    pub bind_address: String,
    pub sweep_interval_secs: u64,
    pub expiry_threshold_secs: u64,
    pub command_buffer_size: usize,
    pub expired_batch_buffer_size: usize,
    pub booking_base_url: String,
    pub booking_notify_enabled: bool,
    pub notify_token: String,
    pub notify_timeout_ms: u64,
}

impl Default for SeatLockConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/seatlock_development".to_string(),
            amqp_url: defaults::AMQP_URL.to_string(),
            exchange_name: defaults::EXCHANGE_NAME.to_string(),
            bind_address: defaults::BIND_ADDRESS.to_string(),
            sweep_interval_secs: defaults::SWEEP_INTERVAL_SECS,
            expiry_threshold_secs: defaults::EXPIRY_THRESHOLD_SECS,
            command_buffer_size: defaults::COMMAND_BUFFER_SIZE,
            expired_batch_buffer_size: defaults::EXPIRED_BATCH_BUFFER_SIZE,
            booking_base_url: defaults::BOOKING_BASE_URL.to_string(),
            booking_notify_enabled: true,
            notify_token: defaults::NOTIFY_TOKEN.to_string(),
            notify_timeout_ms: defaults::NOTIFY_TIMEOUT_MS,
        }
    }
}

impl SeatLockConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(amqp_url) = std::env::var("AMQP_URL") {
            config.amqp_url = amqp_url;
        }

        if let Ok(exchange) = std::env::var("SEATLOCK_EXCHANGE") {
            config.exchange_name = exchange;
        }

        if let Ok(bind) = std::env::var("SEATLOCK_BIND_ADDRESS") {
            config.bind_address = bind;
        }

        if let Ok(interval) = std::env::var("SEATLOCK_SWEEP_INTERVAL_SECS") {
            config.sweep_interval_secs = interval.parse().map_err(|e| {
                SeatLockError::configuration("sweeper", format!("Invalid sweep_interval_secs: {e}"))
            })?;
        }

        if let Ok(threshold) = std::env::var("SEATLOCK_EXPIRY_THRESHOLD_SECS") {
            config.expiry_threshold_secs = threshold.parse().map_err(|e| {
                SeatLockError::configuration(
                    "sweeper",
                    format!("Invalid expiry_threshold_secs: {e}"),
                )
            })?;
        }

        if let Ok(buffer) = std::env::var("SEATLOCK_COMMAND_BUFFER_SIZE") {
            config.command_buffer_size = buffer.parse().map_err(|e| {
                SeatLockError::configuration("actor", format!("Invalid command_buffer_size: {e}"))
            })?;
        }

        if let Ok(base_url) = std::env::var("SEATLOCK_BOOKING_BASE_URL") {
            config.booking_base_url = base_url;
        }

        if let Ok(enabled) = std::env::var("SEATLOCK_BOOKING_NOTIFY_ENABLED") {
            config.booking_notify_enabled = enabled.parse().map_err(|e| {
                SeatLockError::configuration(
                    "client",
                    format!("Invalid booking_notify_enabled: {e}"),
                )
            })?;
        }

        if let Ok(token) = std::env::var("SEATLOCK_NOTIFY_TOKEN") {
            config.notify_token = token;
        }

        if let Ok(timeout) = std::env::var("SEATLOCK_NOTIFY_TIMEOUT_MS") {
            config.notify_timeout_ms = timeout.parse().map_err(|e| {
                SeatLockError::configuration("client", format!("Invalid notify_timeout_ms: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Interval between expiry sweeps
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Age at which an UNPAID lock expires
    pub fn expiry_threshold(&self) -> Duration {
        Duration::from_secs(self.expiry_threshold_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_deployment_defaults() {
        let config = SeatLockConfig::default();
        assert_eq!(config.exchange_name, "meto");
        assert_eq!(config.bind_address, "0.0.0.0:9090");
        assert_eq!(config.sweep_interval_secs, 60);
        assert_eq!(config.expiry_threshold_secs, 420);
        assert_eq!(config.notify_token, "123");
        assert!(config.booking_notify_enabled);
    }

    #[test]
    fn test_duration_accessors() {
        let config = SeatLockConfig {
            sweep_interval_secs: 5,
            expiry_threshold_secs: 90,
            ..Default::default()
        };
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.expiry_threshold(), Duration::from_secs(90));
    }
}
