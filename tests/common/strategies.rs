use proptest::prelude::*;
use proptest::strategy::Just;

/// A state actor operation in generatable form
#[derive(Debug, Clone)]
pub enum LockOp {
    Create {
        schedule_hash: String,
        seat_id: i64,
    },
    MarkPaid {
        schedule_hash: String,
        seat_id: i64,
    },
    AttachBooking {
        schedule_hash: String,
        seat_id: i64,
        booking_id: i64,
    },
    Delete {
        schedule_hash: String,
        seat_id: i64,
    },
}

/// Strategy for generating schedule hashes
///
/// A small pool keeps operations colliding on the same natural keys, which is
/// where the interesting interleavings live.
pub fn schedule_hash_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sched_a".to_string()),
        Just("sched_b".to_string()),
        Just("sched_c".to_string()),
    ]
}

/// Strategy for generating seat identifiers
pub fn seat_id_strategy() -> impl Strategy<Value = i64> {
    1i64..=6
}

/// Strategy for generating booking references
pub fn booking_id_strategy() -> impl Strategy<Value = i64> {
    1i64..=10_000
}

/// Strategy for generating a single lock operation
///
/// Creations are weighted up so generated stores are rarely empty by the time
/// mutations and deletes land.
pub fn lock_op_strategy() -> impl Strategy<Value = LockOp> {
    prop_oneof![
        3 => (schedule_hash_strategy(), seat_id_strategy()).prop_map(|(schedule_hash, seat_id)| {
            LockOp::Create {
                schedule_hash,
                seat_id,
            }
        }),
        2 => (schedule_hash_strategy(), seat_id_strategy()).prop_map(|(schedule_hash, seat_id)| {
            LockOp::MarkPaid {
                schedule_hash,
                seat_id,
            }
        }),
        2 => (schedule_hash_strategy(), seat_id_strategy(), booking_id_strategy()).prop_map(
            |(schedule_hash, seat_id, booking_id)| LockOp::AttachBooking {
                schedule_hash,
                seat_id,
                booking_id,
            }
        ),
        1 => (schedule_hash_strategy(), seat_id_strategy()).prop_map(|(schedule_hash, seat_id)| {
            LockOp::Delete {
                schedule_hash,
                seat_id,
            }
        }),
    ]
}

/// Strategy for generating operation sequences
pub fn lock_op_sequence_strategy() -> impl Strategy<Value = Vec<LockOp>> {
    prop::collection::vec(lock_op_strategy(), 0..40)
}
