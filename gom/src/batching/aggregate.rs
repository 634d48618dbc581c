use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZeroUsize;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream;

use super::BatchInvoker;
use super::BatchSource;
use super::partition::Group;
use super::partition::GroupId;
use super::partition::abandoned;
use crate::error::FetchError;
use crate::registry::BatchResults;

/// How the resolver call of one group ended.
pub(crate) enum GroupOutcome<S, R> {
    Resolved(BatchResults<S, R>),
    Failed(FetchError),
    /// Every caller went away, so the resolver was not called or its call was dropped.
    Abandoned,
}

/// The outcomes of every group of one dispatch window.
///
/// Results stay addressed by group: the same source requested with two different argument sets
/// is two distinct entries. Once built, it is only read.
pub(crate) struct CombinedResult<S, R> {
    field: String,
    outcomes: HashMap<GroupId, GroupOutcome<S, R>>,
}

impl<S, R> CombinedResult<S, R>
where
    S: BatchSource,
    R: Clone,
{
    pub(crate) fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            outcomes: HashMap::new(),
        }
    }

    /// Record the outcome of a group.
    ///
    /// A group is resolved at most once per window. Recording a second outcome for the same group
    /// is an addressing bug: the group is then failed rather than resolved with either outcome.
    pub(crate) fn insert(
        &mut self,
        group: GroupId,
        outcome: GroupOutcome<S, R>,
    ) -> Result<(), FetchError> {
        match self.outcomes.entry(group) {
            Entry::Vacant(entry) => {
                entry.insert(outcome);
                Ok(())
            }
            Entry::Occupied(mut entry) => {
                let error = FetchError::CrossGroupAddressing {
                    field: self.field.clone(),
                    group: group.to_string(),
                };
                entry.insert(GroupOutcome::Failed(error.clone()));
                Err(error)
            }
        }
    }

    /// The result for `source` as computed by `group`.
    pub(crate) fn lookup(&self, group: GroupId, source: &S) -> Result<R, FetchError> {
        match self.outcomes.get(&group) {
            Some(GroupOutcome::Resolved(results)) => {
                results
                    .get(source)
                    .cloned()
                    .ok_or_else(|| FetchError::MissingResult {
                        field: self.field.clone(),
                        requested: format!("{source:?}"),
                    })
            }
            Some(GroupOutcome::Failed(error)) => Err(error.clone()),
            Some(GroupOutcome::Abandoned) => Err(FetchError::Abandoned {
                field: self.field.clone(),
            }),
            None => Err(FetchError::CrossGroupAddressing {
                field: self.field.clone(),
                group: group.to_string(),
            }),
        }
    }
}

/// Call the resolver of every group concurrently and wait for all of them.
///
/// A failing group does not cut the others short. With `max_concurrent_groups`, at most that many
/// resolver calls are in flight at once.
pub(crate) async fn aggregate<S, R>(
    invoker: &BatchInvoker<S, R>,
    groups: &mut [Group<S, R>],
    max_concurrent_groups: Option<NonZeroUsize>,
) -> CombinedResult<S, R>
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    let invocations: Vec<_> = groups
        .iter_mut()
        .map(|group| run_group(invoker, group))
        .collect();

    let outcomes: Vec<_> = match max_concurrent_groups {
        Some(limit) => {
            stream::iter(invocations)
                .buffer_unordered(limit.get())
                .collect()
                .await
        }
        None => join_all(invocations).await,
    };

    let mut combined = CombinedResult::new(invoker.field());
    for (group, outcome) in outcomes {
        if let Err(error) = combined.insert(group, outcome) {
            tracing::error!(%error, "batch results were addressed to a group more than once");
        }
    }
    combined
}

/// Call the resolver for one group, unless every caller of the group went away.
async fn run_group<S, R>(
    invoker: &BatchInvoker<S, R>,
    group: &mut Group<S, R>,
) -> (GroupId, GroupOutcome<S, R>)
where
    S: BatchSource,
    R: Clone + Send + 'static,
{
    if group.is_abandoned() {
        tracing::debug!(
            field = %invoker.field(),
            group = %group.id,
            "every caller went away, skipping resolver call"
        );
        return (group.id, GroupOutcome::Abandoned);
    }

    let Group {
        id,
        arguments,
        sources,
        waiters,
    } = group;

    let outcome = tokio::select! {
        result = invoker.invoke(*id, sources, arguments) => match result {
            Ok(results) => GroupOutcome::Resolved(results),
            Err(error) => GroupOutcome::Failed(error),
        },
        _ = abandoned(waiters) => {
            tracing::debug!(
                field = %invoker.field(),
                group = %id,
                "every caller went away, cancelled resolver call"
            );
            GroupOutcome::Abandoned
        }
    };
    (*id, outcome)
}
