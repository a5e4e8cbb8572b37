//! Cursor pagination

use std::future::Future;

use crate::error::{PROVIDER_NAME, Result};
use crate::traits::Page;

/// Walks a cursor-paginated listing to the end.
///
/// Starts with an empty cursor and keeps fetching while the provider hands
/// back a non-empty `next_page_token`. Items are accumulated in provider
/// order. The first failing page aborts the walk and the items gathered so
/// far are dropped.
pub(crate) async fn collect_all<T, F, Fut>(what: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page_token = String::new();
    let mut pages = 0_usize;

    loop {
        let page = fetch(page_token).await?;
        pages += 1;
        items.extend(page.items);

        if page.next_page_token.is_empty() {
            break;
        }
        page_token = page.next_page_token;
    }

    log::debug!(
        "[{PROVIDER_NAME}] Listed {} {what} in {pages} page(s)",
        items.len()
    );
    Ok(items)
}
