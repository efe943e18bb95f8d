//! Runs a validated list call and shapes its output

use super::invocation::{ListInvocation, Selector};
use super::request::{JsonPage, OperationRequest};
use super::types::OperationDefinition;
use crate::error::Result;
use crate::pagination::{paginate, ListOutput, PageFetcher, PaginationPolicy, PaginationSummary};
use crate::types::JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run `invocation` of `definition` through `fetcher`, handing each output
/// value to `emit`.
///
/// All caller input is validated first; an invalid invocation returns an
/// error without calling `fetcher`. Items are emitted one value per item,
/// `*` emits the raw response body, and a parameter selector emits the
/// parameter's value (or `null`) once the call has succeeded. The summary's
/// `items_emitted` counts the values handed to `emit`.
pub async fn execute<F, E>(
    definition: &OperationDefinition,
    invocation: &ListInvocation,
    fetcher: &F,
    policy: &PaginationPolicy,
    cancel: &CancellationToken,
    mut emit: E,
) -> Result<PaginationSummary>
where
    F: PageFetcher<Request = OperationRequest, Response = JsonPage> + ?Sized,
    E: FnMut(JsonValue) -> Result<()>,
{
    let (mut request, selector, options) = invocation.prepare(definition)?;
    let mut emitted: u64 = 0;
    let mut emit_counted = |value: JsonValue| -> Result<()> {
        emit(value)?;
        emitted += 1;
        Ok(())
    };

    let mut summary = paginate(fetcher, &mut request, &options, policy, cancel, |output| {
        match (&selector, output) {
            (Selector::Parameter(_), _) => Ok(()),
            (_, ListOutput::Items(items)) => items.into_iter().try_for_each(&mut emit_counted),
            (_, ListOutput::RawResponse(page)) => emit_counted(page.into_body()),
        }
    })
    .await?;

    if let Selector::Parameter(name) = &selector {
        if !summary.cancelled {
            let value = invocation
                .params
                .get(name)
                .map_or(JsonValue::Null, |v| JsonValue::String(v.clone()));
            emit_counted(value)?;
        }
    }
    // Count output values, not fetched items
    summary.items_emitted = emitted;

    info!(
        operation = %definition.name,
        pages = summary.pages_fetched,
        items = summary.items_emitted,
        "list call finished"
    );
    Ok(summary)
}
