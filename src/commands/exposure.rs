//! Discover which keywords already surface a blog, starting from its own
//! post titles.

use crate::analysis::keywords::extract_candidates_from_titles;
use crate::analysis::rss::extract_item_titles;
use crate::api::BlogSearch;
use crate::commands::rank::{find_blog_rank, MAX_RANK_LIMIT};
use crate::error::{Error, Result};
use crate::models::keyword::{ExposureItem, ExposureReport};
use crate::models::search::SearchSort;
use log::{debug, info, warn};
use reqwest::{Client, Url};

const RSS_BASE_URL: &str = "https://rss.blog.naver.com/";
const USER_AGENT: &str = "RankPulse/1.0";

pub fn rss_url(blog_id: &str) -> Result<Url> {
    let mut url = Url::parse(RSS_BASE_URL).map_err(|e| Error::invalid_input(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::invalid_input("RSS base URL cannot carry a path"))?
        .pop_if_empty()
        .push(&format!("{blog_id}.xml"));
    Ok(url)
}

/// Titles of the blog's most recent `max_posts` posts from its public feed.
pub async fn fetch_rss_titles(http: &Client, blog_id: &str, max_posts: usize) -> Result<Vec<String>> {
    let blog_id = blog_id.trim();
    if blog_id.is_empty() {
        return Err(Error::invalid_input("blogId is required"));
    }

    let url = rss_url(blog_id)?;
    debug!("fetching RSS feed {url}");

    let response = http
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::provider("Naver blog RSS", status.as_u16(), ""));
    }

    let xml = response.text().await?;
    Ok(extract_item_titles(&xml, max_posts))
}

pub fn exposure_label(rank: Option<u32>, max_rank: u32) -> String {
    match rank {
        Some(rank) => format!("{rank}위"),
        None => format!("{max_rank}위 밖이에요."),
    }
}

/// Rank the blog for every candidate keyword drawn from `titles`.
///
/// A candidate whose scan fails counts as not found. Ranked keywords come
/// first, best rank first; unranked keep candidate order.
pub async fn top_exposure(
    search: &dyn BlogSearch,
    blog_id: &str,
    titles: &[String],
    max_candidates: usize,
    max_rank: u32,
    sort: SearchSort,
) -> Result<ExposureReport> {
    let blog_id = blog_id.trim();
    if blog_id.is_empty() {
        return Err(Error::invalid_input("blogId is required"));
    }
    let max_rank = max_rank.clamp(1, MAX_RANK_LIMIT);

    let candidates = extract_candidates_from_titles(titles, max_candidates);
    let mut items = Vec::with_capacity(candidates.len());

    for keyword in candidates {
        let rank = match find_blog_rank(search, &keyword, blog_id, max_rank, sort).await {
            Ok(result) => result.rank,
            Err(e) => {
                warn!("exposure scan for {keyword:?} failed: {e}");
                None
            }
        };
        items.push(ExposureItem {
            label: exposure_label(rank, max_rank),
            keyword,
            rank,
        });
    }

    items.sort_by_key(|item| item.rank.unwrap_or(u32::MAX));
    info!(
        "exposure for {blog_id:?}: {} of {} candidates ranked",
        items.iter().filter(|i| i.rank.is_some()).count(),
        items.len()
    );

    Ok(ExposureReport {
        ok: true,
        blog_id: blog_id.to_string(),
        max_rank,
        items,
    })
}

/// Feed fetch followed by [`top_exposure`].
pub async fn discover_top_exposure(
    http: &Client,
    search: &dyn BlogSearch,
    blog_id: &str,
    max_posts: usize,
    max_candidates: usize,
    max_rank: u32,
    sort: SearchSort,
) -> Result<ExposureReport> {
    let titles = fetch_rss_titles(http, blog_id, max_posts).await?;
    top_exposure(search, blog_id, &titles, max_candidates, max_rank, sort).await
}
