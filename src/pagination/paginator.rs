//! The paginated list loop

use super::types::{
    IterationState, ListOptions, ListOutput, PageFetcher, PageItem, PagedRequest, PagedResponse,
    PaginationPolicy, PaginationSummary, ResponseSelection,
};
use crate::error::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Run a paged list operation and hand its output to `sink`.
///
/// Pages are fetched one at a time. With [`ResponseSelection::Items`] each
/// page's items reach the sink before the next page is requested; with
/// [`ResponseSelection::RawResponse`] the last page is handed over once the
/// loop ends. The loop fetches a single page when the caller supplied a
/// starting token, set `no_auto_iteration`, or the policy disables
/// auto-iteration; otherwise it stops at the first page without a
/// continuation token.
///
/// `cancel` is checked before every fetch. A cancelled call returns `Ok`
/// with [`PaginationSummary::cancelled`] set and emits nothing further; so
/// does a fetch that fails with [`Error::Cancelled`](crate::Error::Cancelled)
/// after `cancel` fired. The summary keeps the token of the abandoned page.
///
/// A fetch or sink error aborts the call; output already emitted stays
/// emitted. `request` is left holding the token of the last fetch.
pub async fn paginate<F, S>(
    fetcher: &F,
    request: &mut F::Request,
    options: &ListOptions,
    policy: &PaginationPolicy,
    cancel: &CancellationToken,
    mut sink: S,
) -> Result<PaginationSummary>
where
    F: PageFetcher + ?Sized,
    S: FnMut(ListOutput<PageItem<F>, F::Response>) -> Result<()>,
{
    let mut state = IterationState::new(request.token(), options.no_auto_iteration, policy);
    let mut last_page = None;

    while state.should_continue() {
        if cancel.is_cancelled() {
            debug!(pages = state.pages_fetched, "pagination cancelled");
            state.mark_cancelled();
            last_page = None;
            break;
        }

        request.set_token(state.current_token.clone());
        debug!(
            page = state.pages_fetched + 1,
            token = request.token().unwrap_or(""),
            max_results = ?request.max_results(),
            "fetching page"
        );

        let mut page = match fetcher.fetch_page(request).await {
            Ok(page) => page,
            Err(e) if e.is_cancelled() && cancel.is_cancelled() => {
                debug!(pages = state.pages_fetched, "fetch abandoned on cancellation");
                state.mark_cancelled();
                last_page = None;
                break;
            }
            Err(e) => return Err(e),
        };
        state.record_page(page.next_token());

        match options.selection {
            ResponseSelection::Items => {
                let items = page.take_items();
                let count = items.len();
                sink(ListOutput::Items(items))?;
                state.add_emitted(count);
            }
            ResponseSelection::RawResponse => last_page = Some(page),
        }
    }

    if let Some(page) = last_page {
        sink(ListOutput::RawResponse(page))?;
    }

    debug!(
        pages = state.pages_fetched,
        items = state.items_emitted,
        more = state.current_token.is_some(),
        "pagination finished"
    );
    Ok(state.into_summary())
}
