use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use displaydoc::Display;
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexSet;
use tower::BoxError;

use crate::arguments::Arguments;

/// Results of one batched resolver call, keyed by source.
pub type BatchResults<S, R> = HashMap<S, R>;

pub(crate) type ResolverFuture<R> = BoxFuture<'static, Result<R, BoxError>>;
pub(crate) type BatchFuture<S, R> = BoxFuture<'static, Result<BatchResults<S, R>, BoxError>>;

type NoArgsFn<T> = Arc<dyn Fn() -> T + Send + Sync>;
type SourceFn<S, T> = Arc<dyn Fn(S) -> T + Send + Sync>;
type ArgumentsFn<T> = Arc<dyn Fn(Arguments) -> T + Send + Sync>;
type SourceAndArgumentsFn<S, T> = Arc<dyn Fn(S, Arguments) -> T + Send + Sync>;

/// The parameters a resolver declares.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Arity {
    /// no parameters
    NoArgs,
    /// the source only
    SourceOnly,
    /// arguments only
    ArgumentsOnly,
    /// the source and arguments
    SourceAndArguments,
}

/// A resolver called once per field fetch.
pub enum Resolver<S, R> {
    NoArgs(NoArgsFn<ResolverFuture<R>>),
    Source(SourceFn<S, ResolverFuture<R>>),
    Arguments(ArgumentsFn<ResolverFuture<R>>),
    SourceAndArguments(SourceAndArgumentsFn<S, ResolverFuture<R>>),
}

impl<S, R> Resolver<S, R>
where
    S: 'static,
    R: 'static,
{
    pub fn no_args<F, Fut>(resolver: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        Self::NoArgs(Arc::new(move || resolver().boxed()))
    }

    pub fn source<F, Fut>(resolver: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        Self::Source(Arc::new(move |source| resolver(source).boxed()))
    }

    pub fn arguments<F, Fut>(resolver: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        Self::Arguments(Arc::new(move |arguments| resolver(arguments).boxed()))
    }

    pub fn source_and_arguments<F, Fut>(resolver: F) -> Self
    where
        F: Fn(S, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        Self::SourceAndArguments(Arc::new(move |source, arguments| {
            resolver(source, arguments).boxed()
        }))
    }

    pub fn arity(&self) -> Arity {
        match self {
            Resolver::NoArgs(_) => Arity::NoArgs,
            Resolver::Source(_) => Arity::SourceOnly,
            Resolver::Arguments(_) => Arity::ArgumentsOnly,
            Resolver::SourceAndArguments(_) => Arity::SourceAndArguments,
        }
    }
}

/// A resolver servicing many fetches of one field at once.
///
/// It receives the distinct sources of every fetch that shared an argument set during a
/// dispatch window and must return one result per source. Only [`BatchResolver::Sources`] and
/// [`BatchResolver::SourcesAndArguments`] can be wired; the other shapes are rejected when the
/// field wirings are built.
pub enum BatchResolver<S, R> {
    NoArgs(NoArgsFn<BatchFuture<S, R>>),
    Sources(SourceFn<IndexSet<S>, BatchFuture<S, R>>),
    Arguments(ArgumentsFn<BatchFuture<S, R>>),
    SourcesAndArguments(SourceAndArgumentsFn<IndexSet<S>, BatchFuture<S, R>>),
}

impl<S, R> BatchResolver<S, R>
where
    S: 'static,
    R: 'static,
{
    pub fn no_args<F, Fut>(resolver: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BatchResults<S, R>, BoxError>> + Send + 'static,
    {
        Self::NoArgs(Arc::new(move || resolver().boxed()))
    }

    pub fn sources<F, Fut>(resolver: F) -> Self
    where
        F: Fn(IndexSet<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BatchResults<S, R>, BoxError>> + Send + 'static,
    {
        Self::Sources(Arc::new(move |sources| resolver(sources).boxed()))
    }

    pub fn arguments<F, Fut>(resolver: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BatchResults<S, R>, BoxError>> + Send + 'static,
    {
        Self::Arguments(Arc::new(move |arguments| resolver(arguments).boxed()))
    }

    pub fn sources_and_arguments<F, Fut>(resolver: F) -> Self
    where
        F: Fn(IndexSet<S>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BatchResults<S, R>, BoxError>> + Send + 'static,
    {
        Self::SourcesAndArguments(Arc::new(move |sources, arguments| {
            resolver(sources, arguments).boxed()
        }))
    }

    pub fn arity(&self) -> Arity {
        match self {
            BatchResolver::NoArgs(_) => Arity::NoArgs,
            BatchResolver::Sources(_) => Arity::SourceOnly,
            BatchResolver::Arguments(_) => Arity::ArgumentsOnly,
            BatchResolver::SourcesAndArguments(_) => Arity::SourceAndArguments,
        }
    }
}

/// A resolver as supplied by the host, before wiring.
pub enum Handler<S, R> {
    Direct(Resolver<S, R>),
    Batched(BatchResolver<S, R>),
}

impl<S, R> Handler<S, R>
where
    S: 'static,
    R: 'static,
{
    pub fn is_batched(&self) -> bool {
        matches!(self, Handler::Batched(_))
    }

    pub fn arity(&self) -> Arity {
        match self {
            Handler::Direct(resolver) => resolver.arity(),
            Handler::Batched(resolver) => resolver.arity(),
        }
    }
}

impl<S, R> From<Resolver<S, R>> for Handler<S, R> {
    fn from(resolver: Resolver<S, R>) -> Self {
        Handler::Direct(resolver)
    }
}

impl<S, R> From<BatchResolver<S, R>> for Handler<S, R> {
    fn from(resolver: BatchResolver<S, R>) -> Self {
        Handler::Batched(resolver)
    }
}
