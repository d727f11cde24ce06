//! # Seat Lock Error Types
//!
//! Structured error handling for the seat lock state service using thiserror
//! instead of `Box<dyn Error>` patterns.

use thiserror::Error;

/// Error taxonomy for the seat lock state service
#[derive(Error, Debug)]
pub enum SeatLockError {
    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Database query error: {operation}: {message}")]
    DatabaseQuery { operation: String, message: String },

    #[error("Message serialization error: {message}")]
    MessageSerialization { message: String },

    #[error("Message deserialization error: {message}")]
    MessageDeserialization { message: String },

    #[error("Invalid message: {message}")]
    InvalidMessage { message: String },

    #[error("Bus operation failed: {operation}: {message}")]
    BusOperation { operation: String, message: String },

    #[error("Booking notification failed: {message}")]
    Notification { message: String },

    #[error("Command channel error: {message}")]
    CommandChannel { message: String },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },

    #[error("Network timeout: operation {operation} timed out after {timeout_seconds}s")]
    Timeout {
        operation: String,
        timeout_seconds: u64,
    },

    #[error("Connection pool exhausted: {message}")]
    PoolExhausted { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SeatLockError {
    /// Create a database connection error
    pub fn database_connection(message: impl Into<String>) -> Self {
        Self::DatabaseConnection {
            message: message.into(),
        }
    }

    /// Create a database query error
    pub fn database_query(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatabaseQuery {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a message serialization error
    pub fn message_serialization(message: impl Into<String>) -> Self {
        Self::MessageSerialization {
            message: message.into(),
        }
    }

    /// Create a message deserialization error
    pub fn message_deserialization(message: impl Into<String>) -> Self {
        Self::MessageDeserialization {
            message: message.into(),
        }
    }

    /// Create an invalid message error (well-formed JSON, unusable content)
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }

    /// Create a bus operation error
    pub fn bus_operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a booking notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Create a command channel error
    pub fn command_channel(message: impl Into<String>) -> Self {
        Self::CommandChannel {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_seconds,
        }
    }

    /// Create a pool exhausted error
    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Self::PoolExhausted {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Conversion from sqlx::Error to SeatLockError
impl From<sqlx::Error> for SeatLockError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => SeatLockError::database_query("query", "No rows found"),
            sqlx::Error::Database(db_err) => {
                SeatLockError::database_query("database", db_err.to_string())
            }
            sqlx::Error::PoolTimedOut => {
                SeatLockError::timeout("database_pool", 30) // Default timeout
            }
            sqlx::Error::PoolClosed => SeatLockError::pool_exhausted("Database pool is closed"),
            sqlx::Error::Configuration(config_err) => {
                SeatLockError::configuration("database", config_err.to_string())
            }
            _ => SeatLockError::database_connection(err.to_string()),
        }
    }
}

/// Conversion from serde_json::Error to SeatLockError
impl From<serde_json::Error> for SeatLockError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() {
            SeatLockError::message_deserialization(err.to_string())
        } else {
            SeatLockError::message_serialization(err.to_string())
        }
    }
}

/// Conversion from lapin::Error to SeatLockError
impl From<lapin::Error> for SeatLockError {
    fn from(err: lapin::Error) -> Self {
        SeatLockError::bus_operation("amqp", err.to_string())
    }
}

/// Conversion from reqwest::Error to SeatLockError
impl From<reqwest::Error> for SeatLockError {
    fn from(err: reqwest::Error) -> Self {
        SeatLockError::notification(err.to_string())
    }
}

/// Result type alias for seat lock operations
pub type Result<T> = std::result::Result<T, SeatLockError>;
