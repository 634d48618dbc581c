use std::sync::Arc;

use indexmap::IndexSet;
use tracing::Instrument;

use super::BatchSource;
use super::partition::GroupId;
use crate::arguments::Arguments;
use crate::error::FetchError;
use crate::error::WiringError;
use crate::registry::BatchFuture;
use crate::registry::BatchResolver;
use crate::registry::BatchResults;

type SourcesAndArgumentsFn<S, R> =
    Arc<dyn Fn(IndexSet<S>, Arguments) -> BatchFuture<S, R> + Send + Sync>;

/// Calls the batched resolver of one field, once per group.
pub(crate) struct BatchInvoker<S, R> {
    field: String,
    resolver: SourcesAndArgumentsFn<S, R>,
}

impl<S, R> BatchInvoker<S, R>
where
    S: BatchSource,
    R: Send + 'static,
{
    /// Fails if the resolver cannot take a set of sources.
    pub(crate) fn new(field: String, resolver: BatchResolver<S, R>) -> Result<Self, WiringError> {
        let arity = resolver.arity();
        let resolver: SourcesAndArgumentsFn<S, R> = match resolver {
            BatchResolver::Sources(resolver) => {
                Arc::new(move |sources: IndexSet<S>, _: Arguments| resolver(sources))
            }
            BatchResolver::SourcesAndArguments(resolver) => resolver,
            BatchResolver::NoArgs(_) | BatchResolver::Arguments(_) => {
                return Err(WiringError::InvalidBatchedShape { field, arity });
            }
        };
        Ok(Self { field, resolver })
    }

    pub(crate) fn field(&self) -> &str {
        &self.field
    }

    /// Call the resolver for one group.
    ///
    /// A resolver failure fails the group as a whole. Results for sources that were not requested
    /// are dropped.
    pub(crate) async fn invoke(
        &self,
        group: GroupId,
        sources: &IndexSet<S>,
        arguments: &Arguments,
    ) -> Result<BatchResults<S, R>, FetchError> {
        let span = tracing::info_span!(
            "batch_invocation",
            field = %self.field,
            %group,
            sources = sources.len()
        );

        let result = (self.resolver)(sources.clone(), arguments.clone())
            .instrument(span.clone())
            .await;

        span.in_scope(|| match result {
            Ok(mut results) => {
                let returned = results.len();
                results.retain(|source, _| sources.contains(source));
                if results.len() < returned {
                    tracing::warn!(
                        field = %self.field,
                        extra = returned - results.len(),
                        "batched resolver returned results for sources that were not requested, ignoring them"
                    );
                }
                Ok(results)
            }
            Err(error) => {
                tracing::debug!(field = %self.field, %error, "batched resolver failed");
                Err(FetchError::BatchInvocation {
                    field: self.field.clone(),
                    reason: error.to_string(),
                })
            }
        })
    }
}
