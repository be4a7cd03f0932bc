//! Paginated collection fetcher
//!
//! Walks the app listing page by page and assembles the whole collection.
//! Pages are fetched sequentially: the page count is only known once page 1
//! has arrived.

use super::client::DifyClient;
use super::error::ApiResult;
use super::models::App;
use log::info;

/// Number of pages needed for `total` items at `page_size` per page
pub fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1)))
}

/// Fetch every app, in page order and then item order.
///
/// Returns the items together with the total reported by the first page. The
/// two are not compared here; see [`crate::bulk::collection`].
pub async fn fetch_all(client: &DifyClient, token: &str, page_size: u32) -> ApiResult<(Vec<App>, u64)> {
    let page_size = page_size.max(1);

    let first = client.fetch_page(token, 1, page_size).await?;
    let total = first.total;
    if total == 0 {
        return Ok((Vec::new(), 0));
    }

    let max_page = page_count(total, page_size);
    info!("Total apps: {}, Total pages: {}", total, max_page);

    let mut apps = first.items;
    for page in 2..=max_page {
        let content = client.fetch_page(token, page, page_size).await?;
        apps.extend(content.items);
    }

    Ok((apps, total))
}
