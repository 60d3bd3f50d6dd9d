use crate::api::BlogSearch;
use crate::commands::settings::DEFAULT_MAX_RANK;
use crate::error::{Error, Result};
use crate::models::search::{BlogSearchItem, RankScanResult, RankReport, SearchSort};
use log::{debug, info};

/// Results requested per provider call (the provider's maximum)
pub const PAGE_SIZE: u32 = 100;
/// Deepest position the provider will page to
pub const MAX_RANK_LIMIT: u32 = 1000;

pub fn clamp_max_rank(max_rank: Option<u32>) -> u32 {
    max_rank.unwrap_or(DEFAULT_MAX_RANK).clamp(1, MAX_RANK_LIMIT)
}

/// Find the 1-based position of `blog_id` in the ranked results for `keyword`.
///
/// Pages are requested at offsets 1, 101, 201, ... while the offset is within
/// `max_rank`. Scanning stops at the first match, when a page comes back short
/// (the provider ran out of results), or when the next offset passes `max_rank`.
///
/// Positions beyond `max_rank` are never reported, even though the last page
/// requested may extend past it. `rank = None` is a normal outcome. Any page
/// fetch error aborts the scan with no partial result.
///
/// Ownership is a case-insensitive substring test against the item's `link`
/// and `bloggerlink`, so an id that is a substring of another blog's id can
/// produce a false positive.
pub async fn find_blog_rank(
    search: &dyn BlogSearch,
    keyword: &str,
    blog_id: &str,
    max_rank: u32,
    sort: SearchSort,
) -> Result<RankScanResult> {
    let keyword = keyword.trim();
    let needle = blog_id.trim().to_lowercase();
    if keyword.is_empty() || needle.is_empty() {
        return Err(Error::invalid_input("keyword and blogId are required"));
    }

    let max_rank = max_rank.clamp(1, MAX_RANK_LIMIT);
    let mut checked = 0u32;
    let mut doc_total: Option<u64> = None;
    let mut start = 1u32;

    while start <= max_rank {
        let page = search.search_page(keyword, start, PAGE_SIZE, sort).await?;
        let returned = page.items.len() as u32;
        doc_total = Some(page.total);
        if returned > 0 {
            checked = max_rank.min(start + returned - 1);
        }

        debug!("rank scan keyword={keyword:?} start={start} returned={returned}");

        for (index, item) in page.items.iter().enumerate() {
            let position = start + index as u32;
            if position > max_rank {
                break;
            }
            if owned_by(item, &needle) {
                info!("rank scan keyword={keyword:?} blog={blog_id:?} found at {position}");
                return Ok(RankScanResult {
                    rank: Some(position),
                    doc_total,
                    checked_max_rank: checked,
                });
            }
        }

        if returned < PAGE_SIZE {
            break;
        }
        start += PAGE_SIZE;
    }

    info!("rank scan keyword={keyword:?} blog={blog_id:?} not found within {max_rank}");

    Ok(RankScanResult {
        rank: None,
        doc_total,
        checked_max_rank: if checked == 0 { max_rank } else { checked },
    })
}

/// Rank lookup shaped for request handlers.
pub async fn check_rank(
    search: &dyn BlogSearch,
    keyword: &str,
    blog_id: &str,
    max_rank: Option<u32>,
    sort: SearchSort,
) -> Result<RankReport> {
    let result = find_blog_rank(search, keyword, blog_id, clamp_max_rank(max_rank), sort).await?;
    Ok(RankReport {
        keyword: keyword.to_string(),
        blog_id: blog_id.to_string(),
        rank: result.rank,
        doc_total: result.doc_total,
        checked_max_rank: result.checked_max_rank,
    })
}

fn owned_by(item: &BlogSearchItem, needle: &str) -> bool {
    item.link.to_lowercase().contains(needle) || item.bloggerlink.to_lowercase().contains(needle)
}
