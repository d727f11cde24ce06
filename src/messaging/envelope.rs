//! # Lock Message Envelope
//!
//! Wire format shared by every service on the lock event exchange, plus the
//! typed event each inbound message decodes into.
//!
//! The envelope is JSON with camelCase keys. `seatId` travels as the string
//! form of an integer; `bookingId` is a plain integer and only present on
//! booking-created messages.

use serde::{Deserialize, Serialize};

use crate::actor::commands::LockKey;
use crate::constants::message_types;
use crate::error::{Result, SeatLockError};

/// JSON envelope for messages on the lock event exchange
///
/// # Examples
///
/// ```rust
/// use seatlock_core::messaging::LockMessage;
///
/// let message = LockMessage::lock_cancelled("hash_abc", 14);
/// let json = serde_json::to_value(&message).unwrap();
/// assert_eq!(json["messageType"], "LOCK_CANCEL");
/// assert_eq!(json["seatId"], "14");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockMessage {
    pub message_type: String,
    pub schedule_hash: String,
    /// Seat identifier carried as a string on the wire
    pub seat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<i64>,
}

impl LockMessage {
    /// Build the cancellation envelope published when a lock expires
    pub fn lock_cancelled(schedule_hash: impl Into<String>, seat_id: i64) -> Self {
        Self {
            message_type: message_types::LOCK_CANCEL.to_string(),
            schedule_hash: schedule_hash.into(),
            seat_id: seat_id.to_string(),
            booking_id: None,
        }
    }

    /// Decode an envelope from raw bus payload bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            SeatLockError::message_deserialization(format!("Invalid lock message: {e}"))
        })
    }

    /// Encode the envelope for publishing
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            SeatLockError::message_serialization(format!("Failed to encode lock message: {e}"))
        })
    }

    /// Translate the envelope into a typed lock event
    ///
    /// Fails on an unknown message type, a non-numeric seat identifier, or a
    /// booking-created message without a booking id. Callers drop the message
    /// on failure; decode errors never stop the consume loop.
    pub fn into_event(self) -> Result<LockEvent> {
        let seat_id: i64 = self.seat_id.parse().map_err(|_| {
            SeatLockError::invalid_message(format!("seatId is not an integer: {:?}", self.seat_id))
        })?;

        match self.message_type.as_str() {
            message_types::LOCK_CONFIRM => Ok(LockEvent::LockConfirmed {
                key: LockKey::new(self.schedule_hash, seat_id),
            }),
            message_types::ON_BOOK => Ok(LockEvent::PaymentCompleted {
                key: LockKey::new(self.schedule_hash, seat_id),
            }),
            message_types::ON_BOOKING_CREATED => {
                let booking_id = self.booking_id.ok_or_else(|| {
                    SeatLockError::invalid_message("bookingId is required for booking creation")
                })?;
                Ok(LockEvent::BookingCreated {
                    key: LockKey::new(self.schedule_hash, seat_id),
                    booking_id,
                })
            }
            message_types::LOCK_CANCEL => Ok(LockEvent::LockCancelled {
                key: LockKey::new(self.schedule_hash, seat_id),
            }),
            other => Err(SeatLockError::invalid_message(format!(
                "Unknown message type: {other}"
            ))),
        }
    }
}

/// Typed inbound event decoded from a [`LockMessage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockEvent {
    /// A seat was locked; create an UNPAID record
    LockConfirmed { key: LockKey },
    /// The booking was paid; promote the record to PAID
    PaymentCompleted { key: LockKey },
    /// A booking was created; attach its id to the record
    BookingCreated { key: LockKey, booking_id: i64 },
    /// The lock was released elsewhere; delete the record
    LockCancelled { key: LockKey },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lock_confirm() {
        let payload = br#"{"messageType":"LOCK_CONFIRM","scheduleHash":"hash_a","seatId":"7"}"#;
        let event = LockMessage::from_bytes(payload)
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(
            event,
            LockEvent::LockConfirmed {
                key: LockKey::new("hash_a", 7)
            }
        );
    }

    #[test]
    fn test_decode_booking_created_with_id() {
        let payload =
            br#"{"messageType":"ON_BOOKING_CREATED","scheduleHash":"hash_a","seatId":"7","bookingId":42}"#;
        let event = LockMessage::from_bytes(payload)
            .unwrap()
            .into_event()
            .unwrap();
        assert_eq!(
            event,
            LockEvent::BookingCreated {
                key: LockKey::new("hash_a", 7),
                booking_id: 42
            }
        );
    }

    #[test]
    fn test_decode_payment_and_cancel() {
        let paid = br#"{"messageType":"ON_BOOK","scheduleHash":"hash_a","seatId":"7"}"#;
        assert_eq!(
            LockMessage::from_bytes(paid).unwrap().into_event().unwrap(),
            LockEvent::PaymentCompleted {
                key: LockKey::new("hash_a", 7)
            }
        );

        let cancelled = br#"{"messageType":"LOCK_CANCEL","scheduleHash":"hash_a","seatId":"7"}"#;
        assert_eq!(
            LockMessage::from_bytes(cancelled)
                .unwrap()
                .into_event()
                .unwrap(),
            LockEvent::LockCancelled {
                key: LockKey::new("hash_a", 7)
            }
        );
    }

    #[test]
    fn test_booking_created_without_id_rejected() {
        let payload = br#"{"messageType":"ON_BOOKING_CREATED","scheduleHash":"hash_a","seatId":"7"}"#;
        let result = LockMessage::from_bytes(payload).unwrap().into_event();
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_seat_id_rejected() {
        let payload = br#"{"messageType":"LOCK_CONFIRM","scheduleHash":"hash_a","seatId":"front-row"}"#;
        let result = LockMessage::from_bytes(payload).unwrap().into_event();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let payload = br#"{"messageType":"SEAT_UPGRADED","scheduleHash":"hash_a","seatId":"7"}"#;
        let result = LockMessage::from_bytes(payload).unwrap().into_event();
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_payload_rejected() {
        assert!(LockMessage::from_bytes(b"not json").is_err());
        assert!(LockMessage::from_bytes(br#"{"messageType":12}"#).is_err());
    }

    #[test]
    fn test_cancellation_envelope_omits_booking_id() {
        let message = LockMessage::lock_cancelled("hash_abc", 14);
        let json = String::from_utf8(message.to_bytes().unwrap()).unwrap();

        assert!(json.contains(r#""messageType":"LOCK_CANCEL""#));
        assert!(json.contains(r#""scheduleHash":"hash_abc""#));
        assert!(json.contains(r#""seatId":"14""#));
        assert!(!json.contains("bookingId"));
    }

    #[test]
    fn test_envelope_round_trip() {
        let message = LockMessage {
            message_type: message_types::ON_BOOKING_CREATED.to_string(),
            schedule_hash: "hash_rt".to_string(),
            seat_id: "3".to_string(),
            booking_id: Some(9),
        };

        let decoded = LockMessage::from_bytes(&message.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, message);
    }
}
