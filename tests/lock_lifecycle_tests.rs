//! Lifecycle tests driving the state actor and the components around it
//! end to end against the in-memory store and bus.

use seatlock_core::actor::{ChannelFactory, LockCommand, LockCommandSender, LockKey, StateActor};
use seatlock_core::constants::message_types;
use seatlock_core::messaging::{
    CancellationRelay, InMemoryEventBus, LockEventConsumer, LockMessage,
};
use seatlock_core::models::{LockStatus, SeatLock};
use seatlock_core::store::{InMemoryLockStore, LockStore};
use seatlock_core::sweeper::{ExpirySweeper, ExpirySweeperConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

const EXPIRY_THRESHOLD: Duration = Duration::from_secs(420);

async fn started_actor(store: Arc<InMemoryLockStore>) -> (StateActor, LockCommandSender) {
    let (mut actor, command_tx) = StateActor::new(store, EXPIRY_THRESHOLD, 64);
    actor.start().await.unwrap();
    (actor, command_tx)
}

async fn create_lock(command_tx: &LockCommandSender, schedule_hash: &str, seat_id: i64) -> SeatLock {
    let (resp, rx) = oneshot::channel();
    command_tx
        .send(LockCommand::Create {
            key: LockKey::new(schedule_hash, seat_id),
            resp,
        })
        .await
        .unwrap();
    rx.await.unwrap().unwrap()
}

async fn attach_booking(
    command_tx: &LockCommandSender,
    schedule_hash: &str,
    seat_id: i64,
    booking_id: i64,
) {
    let (resp, rx) = oneshot::channel();
    command_tx
        .send(LockCommand::AttachBooking {
            key: LockKey::new(schedule_hash, seat_id),
            booking_id,
            resp,
        })
        .await
        .unwrap();
    rx.await.unwrap().unwrap();
}

async fn mark_paid(command_tx: &LockCommandSender, schedule_hash: &str, seat_id: i64) {
    let (resp, rx) = oneshot::channel();
    command_tx
        .send(LockCommand::MarkPaid {
            key: LockKey::new(schedule_hash, seat_id),
            resp,
        })
        .await
        .unwrap();
    rx.await.unwrap().unwrap();
}

async fn delete_lock(command_tx: &LockCommandSender, schedule_hash: &str, seat_id: i64) {
    let (resp, rx) = oneshot::channel();
    command_tx
        .send(LockCommand::Delete {
            key: LockKey::new(schedule_hash, seat_id),
            resp,
        })
        .await
        .unwrap();
    rx.await.unwrap().unwrap();
}

async fn sweep(command_tx: &LockCommandSender) -> Vec<SeatLock> {
    let (resp, rx) = oneshot::channel();
    command_tx
        .send(LockCommand::Sweep { resp })
        .await
        .unwrap();
    rx.await.unwrap().unwrap()
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..150 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within timeout");
}

#[tokio::test]
async fn fresh_lock_round_trip() {
    let store = Arc::new(InMemoryLockStore::new());
    let (mut actor, command_tx) = started_actor(store.clone()).await;

    let before = chrono::Utc::now().naive_utc();
    create_lock(&command_tx, "S1", 7).await;
    let after = chrono::Utc::now().naive_utc();

    let record = store.find_by_key("S1", 7).await.unwrap().unwrap();
    assert_eq!(record.status, LockStatus::Unpaid.as_str());
    assert_eq!(record.booking_id, None);
    assert!(record.created_at >= before && record.created_at <= after);

    actor.abort();
}

#[tokio::test]
async fn lock_reaches_paid_with_booking_reference() {
    let store = Arc::new(InMemoryLockStore::new());
    let (mut actor, command_tx) = started_actor(store.clone()).await;

    create_lock(&command_tx, "S1", 7).await;
    attach_booking(&command_tx, "S1", 7, 42).await;
    mark_paid(&command_tx, "S1", 7).await;

    let record = store.find_by_key("S1", 7).await.unwrap().unwrap();
    assert_eq!(record.schedule_hash, "S1");
    assert_eq!(record.seat_id, 7);
    assert_eq!(record.status, LockStatus::Paid.as_str());
    assert_eq!(record.booking_id, Some(42));

    actor.abort();
}

#[tokio::test]
async fn lock_at_exact_threshold_age_is_swept() {
    let store = Arc::new(InMemoryLockStore::new());
    let (mut actor, command_tx) = started_actor(store.clone()).await;

    create_lock(&command_tx, "S1", 7).await;

    // Age the record to exactly the expiry threshold
    let threshold = chrono::Duration::from_std(EXPIRY_THRESHOLD).unwrap();
    store
        .backdate_created_at("S1", 7, chrono::Utc::now().naive_utc() - threshold)
        .await;

    let batch = sweep(&command_tx).await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].seat_id, 7);

    actor.abort();
}

#[tokio::test]
async fn paid_locks_survive_every_sweep() {
    let store = Arc::new(InMemoryLockStore::new());
    let (mut actor, command_tx) = started_actor(store.clone()).await;

    create_lock(&command_tx, "S1", 7).await;
    create_lock(&command_tx, "S1", 8).await;
    mark_paid(&command_tx, "S1", 8).await;

    let backdated = chrono::Utc::now().naive_utc() - chrono::Duration::seconds(3600);
    store.backdate_created_at("S1", 7, backdated).await;
    store.backdate_created_at("S1", 8, backdated).await;

    let batch = sweep(&command_tx).await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].seat_id, 7);

    // The paid record stays put no matter how often the sweep runs
    let again = sweep(&command_tx).await;
    assert_eq!(again.len(), 1);
    assert_eq!(store.record_count().await, 2);

    actor.abort();
}

#[tokio::test]
async fn resold_seat_gets_a_fresh_lock() {
    let store = Arc::new(InMemoryLockStore::new());
    let (mut actor, command_tx) = started_actor(store.clone()).await;

    create_lock(&command_tx, "S1", 7).await;
    attach_booking(&command_tx, "S1", 7, 42).await;
    delete_lock(&command_tx, "S1", 7).await;
    create_lock(&command_tx, "S1", 7).await;

    let record = store.find_by_key("S1", 7).await.unwrap().unwrap();
    assert_eq!(record.status, LockStatus::Unpaid.as_str());
    assert_eq!(record.booking_id, None);

    assert!(sweep(&command_tx).await.is_empty());

    actor.abort();
}

#[tokio::test]
async fn expired_lock_flows_from_sweep_to_cancellation() {
    let store = Arc::new(InMemoryLockStore::new());
    let bus = Arc::new(InMemoryEventBus::new());

    let (mut actor, command_tx) = started_actor(store.clone()).await;

    let mut consumer = LockEventConsumer::new(bus.clone(), command_tx.clone());
    consumer.start().await.unwrap();

    let (batch_tx, batch_rx) = ChannelFactory::expired_batch_channel(8);
    let sweeper = Arc::new(
        ExpirySweeper::new(
            command_tx.clone(),
            batch_tx,
            ExpirySweeperConfig {
                sweep_interval: Duration::from_millis(200),
            },
        )
        .unwrap(),
    );
    sweeper.clone().start().await.unwrap();

    let mut relay = CancellationRelay::new(batch_rx, command_tx.clone(), bus.clone(), None);
    relay.start().unwrap();

    // A sibling service confirms a seat lock on the bus
    let confirm = LockMessage {
        message_type: message_types::LOCK_CONFIRM.to_string(),
        schedule_hash: "S1".to_string(),
        seat_id: "7".to_string(),
        booking_id: None,
    };
    bus.publish_raw(confirm.to_bytes().unwrap()).await;

    let probe = store.clone();
    wait_until(|| {
        let store = probe.clone();
        async move { store.record_count().await == 1 }
    })
    .await;

    // Age the lock past the payment window and let the sweep pick it up
    store
        .backdate_created_at(
            "S1",
            7,
            chrono::Utc::now().naive_utc() - chrono::Duration::seconds(500),
        )
        .await;

    let probe = store.clone();
    wait_until(|| {
        let store = probe.clone();
        async move { store.record_count().await == 0 }
    })
    .await;

    let probe = bus.clone();
    wait_until(|| {
        let bus = probe.clone();
        async move { bus.published_count().await >= 1 }
    })
    .await;

    let published = bus.published_messages().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message_type, message_types::LOCK_CANCEL);
    assert_eq!(published[0].schedule_hash, "S1");
    assert_eq!(published[0].seat_id, "7");
    assert_eq!(published[0].booking_id, None);

    // Our own cancellation loops back through the consumer as a harmless no-op
    let stats = consumer.get_stats();
    wait_until(|| {
        let stats = stats.clone();
        async move { stats.get_cancellations_applied() >= 1 }
    })
    .await;
    assert_eq!(store.record_count().await, 0);

    sweeper.stop();
    consumer.stop();
    relay.abort();
    actor.abort();
}
