use std::sync::Arc;
use std::task::Poll;

use futures::FutureExt;
use futures::TryFutureExt;
use futures::future::BoxFuture;
use futures::future::ready;
use tower::Service;

use super::Arity;
use super::Resolver;
use crate::arguments::Arguments;
use crate::batching::BatchChannel;
use crate::batching::BatchSource;
use crate::error::FetchError;

/// A fetch of one field, as issued by the host's per-field resolution step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRequest<S> {
    /// The object the field is resolved on; `None` for root fields.
    pub source: Option<S>,
    pub arguments: Arguments,
}

impl<S> FieldRequest<S> {
    pub fn new(source: S, arguments: Arguments) -> Self {
        Self {
            source: Some(source),
            arguments,
        }
    }

    /// A fetch of a root field, which has no source object.
    pub fn root(arguments: Arguments) -> Self {
        Self {
            source: None,
            arguments,
        }
    }
}

pub(crate) enum Fetcher<S, R> {
    Direct(Resolver<S, R>),
    Batched(BatchChannel<S, R>),
}

/// How one `(type, field)` pair is fetched.
pub struct FieldWiring<S, R> {
    type_name: Arc<str>,
    field_name: Arc<str>,
    coordinate: Arc<str>,
    arity: Arity,
    fetcher: Arc<Fetcher<S, R>>,
}

impl<S, R> Clone for FieldWiring<S, R> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            field_name: self.field_name.clone(),
            coordinate: self.coordinate.clone(),
            arity: self.arity,
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<S, R> FieldWiring<S, R>
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    pub(crate) fn new(
        type_name: &str,
        field_name: &str,
        arity: Arity,
        fetcher: Fetcher<S, R>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
            coordinate: format!("{type_name}.{field_name}").into(),
            arity,
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// `Type.field`
    pub fn coordinate(&self) -> &str {
        &self.coordinate
    }

    pub fn is_batched(&self) -> bool {
        matches!(*self.fetcher, Fetcher::Batched(_))
    }

    /// The parameters the resolver behind this field declares.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Fetch this field for `source`.
    ///
    /// Plain resolvers are called right away. Batched fields are parked until the next
    /// [`FieldWirings::dispatch`](super::FieldWirings::dispatch); the returned future resolves
    /// once that dispatch has run.
    pub fn fetch(
        &self,
        source: Option<S>,
        arguments: Arguments,
    ) -> BoxFuture<'static, Result<R, FetchError>> {
        match &*self.fetcher {
            Fetcher::Direct(resolver) => {
                let call = match (resolver, source) {
                    (Resolver::NoArgs(resolver), _) => resolver(),
                    (Resolver::Source(resolver), Some(source)) => resolver(source),
                    (Resolver::Arguments(resolver), _) => resolver(arguments),
                    (Resolver::SourceAndArguments(resolver), Some(source)) => {
                        resolver(source, arguments)
                    }
                    (Resolver::Source(_) | Resolver::SourceAndArguments(_), None) => {
                        return self.missing_source();
                    }
                };
                let field = self.coordinate.to_string();
                call.map_err(move |error| FetchError::Resolver {
                    field,
                    reason: error.to_string(),
                })
                .boxed()
            }
            Fetcher::Batched(channel) => match source {
                Some(source) => channel.load(source, arguments),
                None => self.missing_source(),
            },
        }
    }

    fn missing_source(&self) -> BoxFuture<'static, Result<R, FetchError>> {
        ready(Err(FetchError::MissingSource {
            field: self.coordinate.to_string(),
        }))
        .boxed()
    }

    pub(crate) fn channel(&self) -> Option<&BatchChannel<S, R>> {
        match &*self.fetcher {
            Fetcher::Batched(channel) => Some(channel),
            Fetcher::Direct(_) => None,
        }
    }
}

impl<S, R> Service<FieldRequest<S>> for FieldWiring<S, R>
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    type Response = R;
    type Error = FetchError;
    type Future = BoxFuture<'static, Result<R, FetchError>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: FieldRequest<S>) -> Self::Future {
        self.fetch(request.source, request.arguments)
    }
}
