//! Request coalescing for batched fields.
//!
//! Every batched field owns one [`BatchChannel`]. Fetches of the field park a [`BatchKey`] in the
//! channel and wait on a oneshot receiver. When the host closes a dispatch window, the channel
//! drains its pending keys and runs them through four stages:
//!
//! 1. [`partition`] groups keys by argument set and de-duplicates sources within each group,
//! 2. [`invoke`] calls the batched resolver once per group,
//! 3. [`aggregate`] runs every group's call concurrently and collects all outcomes,
//! 4. [`redistribute`] sends each waiting caller the result for its own source.

mod aggregate;
mod invoke;
mod partition;
mod redistribute;

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::Instrument;

pub(crate) use self::invoke::BatchInvoker;
use crate::arguments::Arguments;
use crate::configuration::Batching;
use crate::error::FetchError;

/// A source object a batched field can be fetched for.
///
/// Sources are de-duplicated with their `Eq` and `Hash` implementations: equal sources in one
/// dispatch window are handed to the resolver once.
pub trait BatchSource: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> BatchSource for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// One pending fetch of a batched field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchKey<S> {
    source: S,
    arguments: Arguments,
}

impl<S> BatchKey<S> {
    pub fn new(source: S, arguments: Arguments) -> Self {
        Self { source, arguments }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

/// A parked fetch: the key and the channel its result is sent on.
pub(crate) struct Waiter<S, R> {
    pub(crate) key: BatchKey<S>,
    pub(crate) tx: oneshot::Sender<Result<R, FetchError>>,
}

/// The coalescing pipeline of one batched field.
pub(crate) struct BatchChannel<S, R> {
    invoker: BatchInvoker<S, R>,
    max_concurrent_groups: Option<NonZeroUsize>,
    pending: Mutex<Vec<Waiter<S, R>>>,
}

impl<S, R> BatchChannel<S, R>
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    pub(crate) fn new(invoker: BatchInvoker<S, R>, configuration: &Batching) -> Self {
        Self {
            invoker,
            max_concurrent_groups: configuration.max_concurrent_groups,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn field(&self) -> &str {
        self.invoker.field()
    }

    /// Park a fetch until the next dispatch.
    ///
    /// The key is enqueued before this returns, not when the future is first polled.
    pub(crate) fn load(
        &self,
        source: S,
        arguments: Arguments,
    ) -> BoxFuture<'static, Result<R, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push(Waiter {
            key: BatchKey::new(source, arguments),
            tx,
        });

        let field = self.field().to_string();
        async move {
            rx.await
                .map_err(|_| FetchError::Abandoned { field })
                .and_then(|result| result)
        }
        .boxed()
    }

    /// Number of fetches parked since the last dispatch.
    pub(crate) fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Close the current dispatch window, resolving every fetch parked so far.
    ///
    /// Returns the number of fetches that were flushed. Fetches parked while the dispatch is in
    /// progress belong to the next window.
    pub(crate) async fn dispatch(&self) -> usize {
        let waiters = std::mem::take(&mut *self.pending.lock());
        if waiters.is_empty() {
            return 0;
        }
        let keys = waiters.len();

        async {
            let mut groups = partition::partition(waiters);
            let combined =
                aggregate::aggregate(&self.invoker, &mut groups, self.max_concurrent_groups).await;
            redistribute::redistribute(groups, &combined);
        }
        .instrument(tracing::info_span!(
            "batch_dispatch",
            field = %self.field(),
            keys
        ))
        .await;

        keys
    }
}
