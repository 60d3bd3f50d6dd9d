//! Naver SearchAd keyword tool client.
//!
//! Every request is signed: HMAC-SHA256 over `"{timestamp_millis}.{METHOD}.{path}"`
//! keyed with the secret key, base64-encoded into `X-Signature`.

use crate::api::VolumeLookup;
use crate::config::{AppConfig, SearchAdCredentials};
use crate::error::{Error, Result};
use crate::models::keyword::KeywordRow;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

const SEARCHAD_BASE_URL: &str = "https://api.searchad.naver.com";
const KEYWORDS_TOOL_PATH: &str = "/keywordstool";

pub const MAX_EXPAND: usize = 200;

pub fn sign_request(secret: &str, timestamp_millis: i64, method: &str, path: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Signature(e.to_string()))?;
    mac.update(format!("{timestamp_millis}.{method}.{path}").as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

pub struct SearchAdClient {
    client: Client,
    credentials: SearchAdCredentials,
}

impl SearchAdClient {
    pub fn new(credentials: SearchAdCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// `None` when SearchAd is not configured; volume lookups are then skipped.
    pub fn from_config(config: &AppConfig, timeout: Duration) -> Result<Option<Self>> {
        config
            .searchad
            .clone()
            .map(|credentials| Self::new(credentials, timeout))
            .transpose()
    }

    pub async fn keywords_tool(
        &self,
        hint_keywords: &str,
        show_detail: bool,
        include_hint_keyword: Option<bool>,
    ) -> Result<Vec<KeywordRow>> {
        let method = "GET";
        let timestamp = chrono::Utc::now().timestamp_millis();
        let signature = sign_request(
            &self.credentials.secret_key,
            timestamp,
            method,
            KEYWORDS_TOOL_PATH,
        )?;

        let mut query = vec![
            ("hintKeywords", hint_keywords.to_string()),
            ("showDetail", flag(show_detail).to_string()),
        ];
        if let Some(include) = include_hint_keyword {
            query.push(("includeHintKeyword", flag(include).to_string()));
        }

        debug!("searchad keywordstool hint={hint_keywords:?}");

        let response = self
            .client
            .get(format!("{SEARCHAD_BASE_URL}{KEYWORDS_TOOL_PATH}"))
            .query(&query)
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("X-Timestamp", timestamp.to_string())
            .header("X-API-KEY", &self.credentials.api_key)
            .header("X-Customer", &self.credentials.customer_id)
            .header("X-Signature", signature)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider("SearchAd keywordstool", status.as_u16(), body));
        }

        let data: Value = response.json().await?;
        Ok(parse_keyword_rows(&data))
    }
}

#[async_trait]
impl VolumeLookup for SearchAdClient {
    async fn related_keywords(&self, hint: &str) -> Result<Vec<KeywordRow>> {
        self.keywords_tool(hint, true, Some(true)).await
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Reads `keywordList` from a keyword tool response. Missing list means no rows.
pub fn parse_keyword_rows(data: &Value) -> Vec<KeywordRow> {
    let Some(list) = data.get("keywordList").and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .map(|row| {
            let pc = to_count(row.get("monthlyPcQcCnt"));
            let mobile = to_count(row.get("monthlyMobileQcCnt"));
            KeywordRow {
                rel_keyword: row
                    .get("relKeyword")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                monthly_pc_qc_cnt: pc,
                monthly_mobile_qc_cnt: mobile,
                monthly_total_qc_cnt: Some(pc.unwrap_or(0) + mobile.unwrap_or(0)),
                comp_idx: to_count(row.get("compIdx")),
            }
        })
        .collect()
}

/// Numeric counts pass through; placeholders such as `"< 10"` are unknown, not zero.
fn to_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<u64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

pub fn pick_exact(rows: Vec<KeywordRow>, keyword: &str) -> Option<KeywordRow> {
    let exact = rows.iter().position(|row| row.rel_keyword == keyword);
    let mut rows = rows;
    match exact {
        Some(index) => Some(rows.swap_remove(index)),
        None => rows.into_iter().next(),
    }
}

pub fn top_by_volume(mut rows: Vec<KeywordRow>, top_n: usize) -> Vec<KeywordRow> {
    rows.sort_by(|a, b| {
        b.monthly_total_qc_cnt
            .unwrap_or(0)
            .cmp(&a.monthly_total_qc_cnt.unwrap_or(0))
    });
    rows.truncate(top_n.clamp(1, MAX_EXPAND));
    rows
}
