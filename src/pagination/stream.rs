//! Pull-based variant of the list loop

use super::types::{
    IterationState, PageFetcher, PageItem, PagedRequest, PagedResponse, PaginationPolicy,
};
use crate::error::Result;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct Cursor<R, I> {
    request: R,
    state: IterationState,
    buffered: VecDeque<I>,
    failed: bool,
}

/// Stream the items of a paged list operation one by one.
///
/// Follows the same termination rules as [`paginate`](super::paginate), but
/// a page is only fetched once the consumer has drained the previous one.
/// The stream ends when the rules say so or when `cancel` fires before or
/// during a fetch. Any other fetch error is yielded once and ends the stream.
pub fn item_stream<'a, F>(
    fetcher: &'a F,
    request: F::Request,
    no_auto_iteration: bool,
    policy: PaginationPolicy,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<PageItem<F>>> + 'a
where
    F: PageFetcher + ?Sized,
    F::Request: 'a,
    F::Response: 'a,
    PageItem<F>: 'a,
{
    let state = IterationState::new(request.token(), no_auto_iteration, &policy);
    let cursor = Cursor {
        request,
        state,
        buffered: VecDeque::new(),
        failed: false,
    };

    stream::unfold(cursor, move |mut cursor| {
        let cancel = cancel.clone();
        async move {
            loop {
                if cursor.failed {
                    return None;
                }
                if let Some(item) = cursor.buffered.pop_front() {
                    cursor.state.add_emitted(1);
                    return Some((Ok(item), cursor));
                }
                if !cursor.state.should_continue() {
                    return None;
                }
                if cancel.is_cancelled() {
                    debug!(pages = cursor.state.pages_fetched, "item stream cancelled");
                    cursor.state.mark_cancelled();
                    return None;
                }

                cursor.request.set_token(cursor.state.current_token.clone());
                match fetcher.fetch_page(&cursor.request).await {
                    Ok(mut page) => {
                        cursor.state.record_page(page.next_token());
                        cursor.buffered.extend(page.take_items());
                    }
                    Err(e) if e.is_cancelled() && cancel.is_cancelled() => {
                        debug!(pages = cursor.state.pages_fetched, "item stream cancelled");
                        cursor.state.mark_cancelled();
                        return None;
                    }
                    Err(e) => {
                        cursor.failed = true;
                        return Some((Err(e), cursor));
                    }
                }
            }
        }
    })
}
