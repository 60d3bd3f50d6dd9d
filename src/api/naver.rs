//! Naver search OpenAPI client (blog search and DataLab trends).

use crate::analysis::html::strip_markup;
use crate::api::BlogSearch;
use crate::config::{AppConfig, NaverSearchCredentials};
use crate::error::{Error, Result};
use crate::models::search::{BlogSearchItem, BlogSearchPage, SearchSort};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const BLOG_SEARCH_URL: &str = "https://openapi.naver.com/v1/search/blog.json";
const DATALAB_SEARCH_URL: &str = "https://openapi.naver.com/v1/datalab/search";

/// Provider maximum for `display`
pub const MAX_DISPLAY: u32 = 100;
/// Provider maximum for `start`
pub const MAX_START: u32 = 1000;

#[derive(Debug, Default, Deserialize)]
struct RawBlogSearchResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    items: Vec<RawBlogSearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBlogSearchItem {
    title: String,
    link: String,
    bloggername: String,
    bloggerlink: String,
    description: String,
    postdate: String,
}

pub struct NaverSearchClient {
    client: Client,
    credentials: NaverSearchCredentials,
}

impl NaverSearchClient {
    pub fn new(credentials: NaverSearchCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn from_config(config: &AppConfig, timeout: Duration) -> Result<Self> {
        let credentials = config
            .naver_search
            .clone()
            .ok_or(Error::MissingCredentials {
                service: "Naver search",
            })?;
        Self::new(credentials, timeout)
    }

    pub async fn blog_search(
        &self,
        query: &str,
        display: u32,
        start: u32,
        sort: SearchSort,
    ) -> Result<BlogSearchPage> {
        let display = display.clamp(1, MAX_DISPLAY);
        let start = start.clamp(1, MAX_START);

        debug!("blog search query={query:?} start={start} display={display}");

        let response = self
            .client
            .get(BLOG_SEARCH_URL)
            .query(&[
                ("query", query.to_string()),
                ("display", display.to_string()),
                ("start", start.to_string()),
                ("sort", sort.as_str().to_string()),
            ])
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider("Naver blog search", status.as_u16(), body));
        }

        let raw: RawBlogSearchResponse = response.json().await?;
        Ok(into_page(raw))
    }

    /// Forwards a DataLab search-trend request body and returns the provider's JSON.
    pub async fn datalab_search_trend(&self, body: &Value) -> Result<Value> {
        validate_datalab_body(body)?;

        let response = self
            .client
            .post(DATALAB_SEARCH_URL)
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider("Naver DataLab", status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl BlogSearch for NaverSearchClient {
    async fn search_page(
        &self,
        query: &str,
        start: u32,
        display: u32,
        sort: SearchSort,
    ) -> Result<BlogSearchPage> {
        self.blog_search(query, display, start, sort).await
    }
}

fn into_page(raw: RawBlogSearchResponse) -> BlogSearchPage {
    let items = raw
        .items
        .into_iter()
        .map(|it| BlogSearchItem {
            title: strip_markup(&it.title),
            link: it.link,
            bloggername: strip_markup(&it.bloggername),
            bloggerlink: it.bloggerlink,
            description: strip_markup(&it.description),
            postdate: it.postdate,
        })
        .collect();

    BlogSearchPage {
        total: raw.total,
        items,
    }
}

fn validate_datalab_body(body: &Value) -> Result<()> {
    let has_text = |key: &str| body.get(key).and_then(Value::as_str).is_some_and(|v| !v.is_empty());
    let has_groups = body.get("keywordGroups").is_some_and(Value::is_array);

    if has_text("startDate") && has_text("endDate") && has_text("timeUnit") && has_groups {
        Ok(())
    } else {
        Err(Error::invalid_input(
            "startDate/endDate/timeUnit/keywordGroups are required",
        ))
    }
}
