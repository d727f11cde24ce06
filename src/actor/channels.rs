//! # Semantic Channel Types
//!
//! NewType wrappers around tokio mpsc channels to prevent channel confusion
//! and make component data flow explicit:
//!
//! - [`LockCommandSender`] / [`LockCommandReceiver`] - the state actor inbox
//! - [`ExpiredBatchSender`] / [`ExpiredBatchReceiver`] - sweep results flowing
//!   to the outbound relay
//!
//! Without these wrappers it is possible to wire a sender to the wrong
//! receiver and get a type error only at the call site, far from the
//! construction site. The wrappers move that mistake to construction time.

use tokio::sync::mpsc;

use crate::actor::commands::{ExpiredBatch, LockCommand};

/// Sender for state actor commands
#[derive(Debug, Clone)]
pub struct LockCommandSender(pub(crate) mpsc::Sender<LockCommand>);

impl LockCommandSender {
    pub async fn send(
        &self,
        command: LockCommand,
    ) -> Result<(), mpsc::error::SendError<LockCommand>> {
        self.0.send(command).await
    }

    pub fn try_send(
        &self,
        command: LockCommand,
    ) -> Result<(), mpsc::error::TrySendError<LockCommand>> {
        self.0.try_send(command)
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.0.max_capacity()
    }

    /// Access to the inner sender for advanced use cases
    pub fn inner(&self) -> &mpsc::Sender<LockCommand> {
        &self.0
    }
}

/// Receiver for state actor commands
#[derive(Debug)]
pub struct LockCommandReceiver(pub(crate) mpsc::Receiver<LockCommand>);

impl LockCommandReceiver {
    pub async fn recv(&mut self) -> Option<LockCommand> {
        self.0.recv().await
    }

    pub fn try_recv(&mut self) -> Result<LockCommand, mpsc::error::TryRecvError> {
        self.0.try_recv()
    }

    pub fn close(&mut self) {
        self.0.close()
    }
}

/// Sender for expired record batches
#[derive(Debug, Clone)]
pub struct ExpiredBatchSender(pub(crate) mpsc::Sender<ExpiredBatch>);

impl ExpiredBatchSender {
    pub async fn send(
        &self,
        batch: ExpiredBatch,
    ) -> Result<(), mpsc::error::SendError<ExpiredBatch>> {
        self.0.send(batch).await
    }

    pub fn try_send(
        &self,
        batch: ExpiredBatch,
    ) -> Result<(), mpsc::error::TrySendError<ExpiredBatch>> {
        self.0.try_send(batch)
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.0.max_capacity()
    }
}

/// Receiver for expired record batches
#[derive(Debug)]
pub struct ExpiredBatchReceiver(pub(crate) mpsc::Receiver<ExpiredBatch>);

impl ExpiredBatchReceiver {
    pub async fn recv(&mut self) -> Option<ExpiredBatch> {
        self.0.recv().await
    }

    pub fn try_recv(&mut self) -> Result<ExpiredBatch, mpsc::error::TryRecvError> {
        self.0.try_recv()
    }

    pub fn close(&mut self) {
        self.0.close()
    }
}

/// Factory for creating semantic channel pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelFactory;

impl ChannelFactory {
    /// Create a state actor command channel pair
    pub fn lock_command_channel(buffer_size: usize) -> (LockCommandSender, LockCommandReceiver) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (LockCommandSender(tx), LockCommandReceiver(rx))
    }

    /// Create an expired batch channel pair
    pub fn expired_batch_channel(buffer_size: usize) -> (ExpiredBatchSender, ExpiredBatchReceiver) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (ExpiredBatchSender(tx), ExpiredBatchReceiver(rx))
    }
}

impl From<mpsc::Sender<LockCommand>> for LockCommandSender {
    fn from(sender: mpsc::Sender<LockCommand>) -> Self {
        LockCommandSender(sender)
    }
}

impl From<mpsc::Sender<ExpiredBatch>> for ExpiredBatchSender {
    fn from(sender: mpsc::Sender<ExpiredBatch>) -> Self {
        ExpiredBatchSender(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::commands::LockKey;
    use tokio::sync::oneshot;

    fn sweep_command() -> LockCommand {
        let (resp, _rx) = oneshot::channel();
        LockCommand::Sweep { resp }
    }

    fn delete_command(key: LockKey) -> LockCommand {
        let (resp, _rx) = oneshot::channel();
        LockCommand::Delete { key, resp }
    }

    #[tokio::test]
    async fn test_lock_command_channel_send_recv() {
        let (tx, mut rx) = ChannelFactory::lock_command_channel(4);

        tx.send(delete_command(LockKey::new("hash_a", 1)))
            .await
            .unwrap();

        match rx.recv().await {
            Some(LockCommand::Delete { key, .. }) => {
                assert_eq!(key, LockKey::new("hash_a", 1));
            }
            other => panic!("Expected Delete command, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lock_command_channel_capacity() {
        let (tx, _rx) = ChannelFactory::lock_command_channel(8);
        assert_eq!(tx.max_capacity(), 8);
        assert_eq!(tx.capacity(), 8);
    }

    #[tokio::test]
    async fn test_lock_command_sender_clone() {
        let (tx, mut rx) = ChannelFactory::lock_command_channel(4);
        let tx2 = tx.clone();

        tx.send(sweep_command()).await.unwrap();
        tx2.send(sweep_command()).await.unwrap();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_lock_command_sender_is_closed() {
        let (tx, rx) = ChannelFactory::lock_command_channel(4);
        assert!(!tx.is_closed());
        drop(rx);
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_lock_command_receiver_close() {
        let (tx, mut rx) = ChannelFactory::lock_command_channel(4);
        rx.close();
        assert!(tx.send(sweep_command()).await.is_err());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_lock_command_try_send_try_recv() {
        let (tx, mut rx) = ChannelFactory::lock_command_channel(1);

        assert!(rx.try_recv().is_err());
        tx.try_send(sweep_command()).unwrap();
        assert!(tx.try_send(sweep_command()).is_err());
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_expired_batch_channel_send_recv() {
        let (tx, mut rx) = ChannelFactory::expired_batch_channel(4);

        tx.send(Vec::new()).await.unwrap();

        let batch = rx.recv().await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_expired_batch_try_send_full() {
        let (tx, _rx) = ChannelFactory::expired_batch_channel(1);

        tx.try_send(Vec::new()).unwrap();
        match tx.try_send(Vec::new()) {
            Err(mpsc::error::TrySendError::Full(batch)) => assert!(batch.is_empty()),
            other => panic!("Expected Full error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_from_conversions() {
        let (raw_tx, mut rx) = mpsc::channel(4);
        let tx: LockCommandSender = raw_tx.into();
        tx.send(sweep_command()).await.unwrap();
        assert!(rx.recv().await.is_some());

        let (raw_batch_tx, mut batch_rx) = mpsc::channel(4);
        let batch_tx: ExpiredBatchSender = raw_batch_tx.into();
        batch_tx.send(Vec::new()).await.unwrap();
        assert!(batch_rx.recv().await.is_some());
    }

    #[test]
    fn test_channel_factory_default() {
        let factory = ChannelFactory;
        assert_eq!(format!("{factory:?}"), "ChannelFactory");
        let _default_factory = ChannelFactory::default();
    }
}
