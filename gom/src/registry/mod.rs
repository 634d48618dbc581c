//! Field wiring registry.
//!
//! The host registers one handler per `(type, field)` and builds the registry once at startup.
//! Batched handlers get their own coalescing pipeline; the pipelines are flushed together by
//! [`FieldWirings::dispatch`].

mod resolver;
mod wiring;

use futures::future::join_all;
use indexmap::IndexMap;

pub use self::resolver::Arity;
pub(crate) use self::resolver::BatchFuture;
pub use self::resolver::BatchResolver;
pub use self::resolver::BatchResults;
pub use self::resolver::Handler;
pub use self::resolver::Resolver;
pub use self::wiring::FieldRequest;
pub use self::wiring::FieldWiring;
use self::wiring::Fetcher;
use crate::batching::BatchChannel;
use crate::batching::BatchInvoker;
use crate::batching::BatchSource;
use crate::configuration::Configuration;
use crate::error::WiringError;

struct Registration<S, R> {
    type_name: String,
    field_name: String,
    handler: Handler<S, R>,
}

/// Collects handlers before they are wired.
pub struct FieldWiringsBuilder<S, R> {
    configuration: Configuration,
    registrations: Vec<Registration<S, R>>,
}

impl<S, R> FieldWiringsBuilder<S, R>
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Register a handler for `type_name.field_name`.
    pub fn handler(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        handler: impl Into<Handler<S, R>>,
    ) -> Self {
        self.registrations.push(Registration {
            type_name: type_name.into(),
            field_name: field_name.into(),
            handler: handler.into(),
        });
        self
    }

    /// Register a resolver called once per fetch.
    pub fn resolver(
        self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: Resolver<S, R>,
    ) -> Self {
        self.handler(type_name, field_name, resolver)
    }

    /// Register a resolver whose fetches are coalesced per dispatch window.
    pub fn batched(
        self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: BatchResolver<S, R>,
    ) -> Self {
        self.handler(type_name, field_name, resolver)
    }

    /// Wire every registered handler.
    ///
    /// Fails if a batched handler cannot take a set of sources, or if a field is registered twice.
    pub fn build(self) -> Result<FieldWirings<S, R>, WiringError> {
        let mut wirings: IndexMap<String, IndexMap<String, FieldWiring<S, R>>> = IndexMap::new();
        let mut batched = Vec::new();

        for Registration {
            type_name,
            field_name,
            handler,
        } in self.registrations
        {
            let fields = wirings.entry(type_name.clone()).or_default();
            if fields.contains_key(&field_name) {
                return Err(WiringError::DuplicateField {
                    field: format!("{type_name}.{field_name}"),
                });
            }

            let arity = handler.arity();
            let fetcher = match handler {
                Handler::Direct(resolver) => Fetcher::Direct(resolver),
                Handler::Batched(resolver) => {
                    let invoker =
                        BatchInvoker::new(format!("{type_name}.{field_name}"), resolver)?;
                    Fetcher::Batched(BatchChannel::new(
                        invoker,
                        &self.configuration.batching,
                    ))
                }
            };
            let wiring = FieldWiring::new(&type_name, &field_name, arity, fetcher);
            if wiring.is_batched() {
                batched.push(wiring.clone());
            }
            tracing::debug!(
                field = %wiring.coordinate(),
                batched = wiring.is_batched(),
                %arity,
                "wired field"
            );
            fields.insert(field_name, wiring);
        }

        Ok(FieldWirings { wirings, batched })
    }
}

/// Every wired field, and the batch channels to flush on each dispatch window.
pub struct FieldWirings<S, R> {
    wirings: IndexMap<String, IndexMap<String, FieldWiring<S, R>>>,
    batched: Vec<FieldWiring<S, R>>,
}

impl<S, R> FieldWirings<S, R>
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    pub fn builder() -> FieldWiringsBuilder<S, R> {
        FieldWiringsBuilder {
            configuration: Configuration::default(),
            registrations: Vec::new(),
        }
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&FieldWiring<S, R>> {
        self.wirings.get(type_name)?.get(field_name)
    }

    /// Every wiring, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldWiring<S, R>> {
        self.wirings.values().flat_map(|fields| fields.values())
    }

    pub fn len(&self) -> usize {
        self.wirings.values().map(|fields| fields.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of batch channels, one per batched field.
    pub fn batch_channels(&self) -> usize {
        self.batched.len()
    }

    /// Number of batched fetches waiting for the next dispatch.
    pub fn pending(&self) -> usize {
        self.channels().map(BatchChannel::pending).sum()
    }

    /// Close the current dispatch window of every batched field.
    ///
    /// Channels are flushed concurrently. Returns the number of fetches flushed; resolving a batched
    /// field may park further fetches, so hosts settle nested fields with
    /// `while wirings.dispatch().await > 0 {}`.
    pub async fn dispatch(&self) -> usize {
        join_all(self.channels().map(BatchChannel::dispatch))
            .await
            .into_iter()
            .sum()
    }

    fn channels(&self) -> impl Iterator<Item = &BatchChannel<S, R>> {
        self.batched.iter().filter_map(FieldWiring::channel)
    }
}
