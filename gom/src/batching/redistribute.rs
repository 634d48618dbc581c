use super::BatchSource;
use super::aggregate::CombinedResult;
use super::partition::Group;
use crate::error::FetchError;

/// Send every parked caller the result for its own source, looked up in its own group only.
///
/// Callers sharing a source within a group each receive a clone of the same result.
pub(crate) fn redistribute<S, R>(groups: Vec<Group<S, R>>, combined: &CombinedResult<S, R>)
where
    S: BatchSource,
    R: Clone,
{
    for group in groups {
        let mut delivered = 0;
        let mut failed = 0;

        for waiter in group.waiters {
            let result = combined.lookup(group.id, waiter.key.source());
            match &result {
                Ok(_) => delivered += 1,
                Err(error @ FetchError::CrossGroupAddressing { .. }) => {
                    tracing::error!(%error, "batch results could not be addressed to their group");
                    failed += 1;
                }
                Err(_) => failed += 1,
            }

            // The caller may have dropped its future; the other callers still get theirs.
            if waiter.tx.send(result).is_err() {
                tracing::debug!(
                    group = %group.id,
                    source = ?waiter.key.source(),
                    "caller went away before its result was delivered"
                );
            }
        }

        tracing::debug!(group = %group.id, delivered, failed, "redistributed group results");
    }
}
