use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::warn;

/// Completion handle for a scheduled store operation.
///
/// Resolves exactly once. If the worker goes away without reporting (a
/// caller-supplied closure panicked, or the runtime shut down), it resolves
/// to the operation's fallback value instead. Dropping a `Pending` does not
/// cancel the operation.
#[must_use = "the operation runs regardless, but its result is only observable by awaiting"]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
    fallback: fn() -> T,
}

impl<T> Pending<T> {
    /// Create a completion pair: the sender goes to the worker, the
    /// `Pending` to the caller.
    pub(crate) fn channel(fallback: fn() -> T) -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, fallback })
    }
}

impl<T> Future for Pending<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(_)) => {
                warn!("store worker dropped the operation; using fallback result");
                Poll::Ready((this.fallback)())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_sent_value() {
        let (tx, pending) = Pending::channel(|| 0u32);
        tx.send(7).unwrap();
        assert_eq!(pending.await, 7);
    }

    #[tokio::test]
    async fn dropped_sender_resolves_to_fallback() {
        let (tx, pending) = Pending::<Option<u32>>::channel(|| None);
        drop(tx);
        assert_eq!(pending.await, None);
    }
}
