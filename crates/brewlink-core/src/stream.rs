// ── Reactive slice streams ──
//
// `Stream` adapters for consuming slice changes from the `Store` with
// `StreamExt` combinators instead of raw `watch` receivers.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::Tagged;

/// A subscription to one state slice.
///
/// Provides point-in-time snapshot access and change notification, and
/// converts into a `Stream` of tagged values.
pub struct SliceStream<T: Clone + Send + Sync + 'static> {
    receiver: watch::Receiver<Tagged<T>>,
}

impl<T: Clone + Send + Sync + 'static> SliceStream<T> {
    pub fn new(receiver: watch::Receiver<Tagged<T>>) -> Self {
        Self { receiver }
    }

    /// The latest slice value.
    pub fn latest(&self) -> Tagged<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new value.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<Tagged<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SliceWatchStream<T> {
        SliceWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> From<watch::Receiver<Tagged<T>>> for SliceStream<T> {
    fn from(receiver: watch::Receiver<Tagged<T>>) -> Self {
        Self::new(receiver)
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current value immediately, then a new `Tagged<T>` each
/// time the slice is replaced.
pub struct SliceWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<Tagged<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for SliceWatchStream<T> {
    type Item = Tagged<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin when the inner type is Unpin, and
        // Tagged<T> always is.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_stream::StreamExt as _;

    use super::*;
    use crate::model::ScaleStatus;
    use crate::store::Store;

    #[tokio::test]
    async fn stream_yields_current_then_changes() {
        let store = Store::new();
        let mut stream = SliceStream::new(store.subscribe_scale()).into_stream();

        let first = stream.next().await.unwrap();
        assert!(!first.value.connected);

        store.scale.replace(ScaleStatus {
            connected: true,
            ..ScaleStatus::default()
        });
        let second = stream.next().await.unwrap();
        assert!(second.value.connected);
    }
}
