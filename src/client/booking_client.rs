//! # Booking API Client
//!
//! HTTP client for notifying the booking service when a seat lock expires.
//! Delivery is best-effort: a single POST per expired record, with failures
//! logged and swallowed by the caller so one unreachable booking service
//! never stalls the cancellation pipeline.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::defaults;
use crate::error::{Result, SeatLockError};

/// Configuration for the booking API client
///
/// # Examples
///
/// ```rust
/// use seatlock_core::client::BookingApiConfig;
///
/// let config = BookingApiConfig::default();
/// assert_eq!(config.base_url, "http://127.0.0.1:3000");
/// assert_eq!(config.timeout_ms, 30000);
/// assert_eq!(config.token, "123");
/// ```
#[derive(Debug, Clone)]
pub struct BookingApiConfig {
    /// Base URL for the booking service (e.g., "<http://bookings:3000>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Shared token the booking service expects in timeout notifications
    pub token: String,
}

impl Default for BookingApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BOOKING_BASE_URL.to_string(),
            timeout_ms: defaults::NOTIFY_TIMEOUT_MS,
            token: defaults::NOTIFY_TOKEN.to_string(),
        }
    }
}

/// Request body for POST /bookings/timeout
///
/// `seat_number` travels as a string even though seat identifiers are
/// numeric everywhere else; the booking service expects it that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingTimeoutRequest {
    pub schedule_hash: String,
    pub seat_number: String,
    pub token: String,
}

/// HTTP client for the booking service timeout endpoint
#[derive(Clone)]
pub struct BookingApiClient {
    client: Client,
    config: BookingApiConfig,
    base_url: Url,
}

impl std::fmt::Debug for BookingApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}

impl BookingApiClient {
    /// Create a new booking API client with the given configuration
    pub fn new(config: BookingApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SeatLockError::configuration("booking_client", format!("Invalid base URL: {e}"))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("seatlock-core/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SeatLockError::configuration(
                    "booking_client",
                    format!("Failed to create HTTP client: {e}"),
                )
            })?;

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            "Created booking API client"
        );

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Notify the booking service that a seat lock timed out
    ///
    /// POST /bookings/timeout
    pub async fn notify_timeout(&self, schedule_hash: &str, seat_id: i64) -> Result<()> {
        let url = self.base_url.join("/bookings/timeout").map_err(|e| {
            SeatLockError::configuration("booking_client", format!("Failed to construct URL: {e}"))
        })?;

        let request = BookingTimeoutRequest {
            schedule_hash: schedule_hash.to_string(),
            seat_number: seat_id.to_string(),
            token: self.config.token.clone(),
        };

        debug!(
            url = %url,
            schedule_hash = %schedule_hash,
            seat_id = seat_id,
            "Notifying booking service of seat lock timeout"
        );

        let response = self.client.post(url).json(&request).send().await?;

        if response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                schedule_hash = %schedule_hash,
                seat_id = seat_id,
                response_body = %body,
                "Booking service acknowledged timeout notification"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(
                status = %status,
                error = %error_text,
                schedule_hash = %schedule_hash,
                seat_id = seat_id,
                "Booking service rejected timeout notification"
            );
            Err(SeatLockError::notification(format!(
                "HTTP {status}: {error_text}"
            )))
        }
    }
}
