pub mod seat_lock;

// Re-export core models for easy access
pub use seat_lock::{LockStatus, NewSeatLock, SeatLock};
