//! scatter-gather over independent futures.
//!
//! all units are polled on the calling task, so nothing here needs `Send`
//! or `'static`. results come back in input order regardless of which unit
//! finished first, and the caller only resumes once every unit is done.

use std::future::Future;

use futures_util::future::join_all;

/// run every unit concurrently and collect the outputs positionally
pub async fn gather<I, F>(units: I) -> Vec<F::Output>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    join_all(units).await
}
