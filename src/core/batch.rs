use std::future::Future;

use futures::future::join_all;

/// Run `total` tasks in fixed-size chunks. Members of a chunk run
/// concurrently with no ordering guarantee among them; chunk N+1 does not
/// start until every member of chunk N has settled, so at most
/// `max_concurrent` tasks are ever in flight. Returns how many tasks
/// reported success. No cancellation: a started task runs to completion.
pub async fn run_chunked<F, Fut>(total: usize, max_concurrent: usize, mut task: F) -> usize
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = bool>,
{
    let chunk = max_concurrent.max(1);
    let mut completed = 0;
    let mut start = 0;

    while start < total {
        let end = (start + chunk).min(total);
        let results = join_all((start..end).map(&mut task)).await;
        completed += results.into_iter().filter(|ok| *ok).count();
        start = end;
    }

    completed
}
