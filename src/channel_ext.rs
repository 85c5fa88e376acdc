use smol::channel::{Receiver, RecvError};

/// An extension trait that adds functionality to smol channel receivers.
pub trait ReceiverExt<T> {
    /// Get the newest element in the channel, discarding all previous messages. Blocks if there
    /// are no messages in the channel.
    async fn recv_last(&self) -> Result<T, RecvError>;

    /// Same as recv_last, but returns Ok(None) if the channel is empty.
    async fn recv_maybe_last(&self) -> Result<Option<T>, RecvError>;

    /// Take every message that is ready right now, oldest first. Never blocks.
    fn drain(&self) -> Vec<T>;
}

impl<T> ReceiverExt<T> for Receiver<T> {
    async fn recv_last(&self) -> Result<T, RecvError> {
        let len = self.len();

        // remove first len - 1 messages
        if len > 1 {
            for _ in 0..(len - 1) {
                let _ = self.recv().await?;
            }
        }

        self.recv().await
    }

    async fn recv_maybe_last(&self) -> Result<Option<T>, RecvError> {
        if self.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.recv_last().await?))
        }
    }

    fn drain(&self) -> Vec<T> {
        std::iter::from_fn(|| self.try_recv().ok()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorBox;
    use macro_rules_attribute::apply;
    use smol::channel;
    use smol_macros::test;

    #[apply(test!)]
    async fn test_recv_maybe_last_on_empty_channel() -> Result<(), ErrorBox> {
        let (_tx, rx) = channel::bounded::<u8>(4);

        assert_eq!(None, rx.recv_maybe_last().await?);
        Ok(())
    }

    #[apply(test!)]
    async fn test_recv_maybe_last_keeps_newest() -> Result<(), ErrorBox> {
        let (tx, rx) = channel::bounded(4);
        tx.send(1).await?;
        tx.send(2).await?;
        tx.send(3).await?;

        assert_eq!(Some(3), rx.recv_maybe_last().await?);
        assert!(rx.is_empty());
        Ok(())
    }

    #[apply(test!)]
    async fn test_drain_returns_everything_in_order() -> Result<(), ErrorBox> {
        let (tx, rx) = channel::bounded(4);
        tx.send(1).await?;
        tx.send(2).await?;

        assert_eq!(vec![1, 2], rx.drain());
        assert!(rx.drain().is_empty());

        drop(tx);
        assert!(rx.drain().is_empty());
        Ok(())
    }
}
