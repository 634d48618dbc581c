use std::fmt;

use futures::future::join_all;
use indexmap::IndexMap;
use indexmap::IndexSet;
use tokio::sync::oneshot;

use super::BatchSource;
use super::Waiter;
use crate::arguments::Arguments;

/// Identifies a group within one dispatch window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct GroupId(pub(crate) usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The pending fetches of one dispatch window sharing an argument set.
pub(crate) struct Group<S, R> {
    pub(crate) id: GroupId,
    pub(crate) arguments: Arguments,
    /// Distinct sources of `waiters`, in the order they were first requested.
    pub(crate) sources: IndexSet<S>,
    pub(crate) waiters: Vec<Waiter<S, R>>,
}

impl<S, R> Group<S, R> {
    /// Whether every caller of this group has dropped its future.
    pub(crate) fn is_abandoned(&self) -> bool {
        self.waiters.iter().all(|waiter| waiter.tx.is_closed())
    }
}

/// Completes once every caller in `waiters` has dropped its future.
pub(crate) async fn abandoned<S, R>(waiters: &mut [Waiter<S, R>]) {
    join_all(
        waiters
            .iter_mut()
            .map(|waiter| &mut waiter.tx)
            .map(oneshot::Sender::closed),
    )
    .await;
}

/// Split the fetches of one dispatch window into groups of equal argument sets.
///
/// Every waiter lands in exactly one group, and keeps its submission order within that group.
pub(crate) fn partition<S, R>(waiters: Vec<Waiter<S, R>>) -> Vec<Group<S, R>>
where
    S: BatchSource,
{
    let mut groups: IndexMap<Arguments, Group<S, R>> = IndexMap::new();

    for waiter in waiters {
        let id = GroupId(groups.len());
        let group = groups
            .entry(waiter.key.arguments().clone())
            .or_insert_with_key(|arguments| Group {
                id,
                arguments: arguments.clone(),
                sources: IndexSet::new(),
                waiters: Vec::new(),
            });
        group.sources.insert(waiter.key.source().clone());
        group.waiters.push(waiter);
    }

    tracing::debug!(groups = groups.len(), "partitioned pending fetches by argument set");

    groups.into_values().collect()
}
