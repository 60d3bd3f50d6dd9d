use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSort {
    #[default]
    Sim,
    Date,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSort::Sim => "sim",
            SearchSort::Date => "date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sim" => Some(SearchSort::Sim),
            "date" => Some(SearchSort::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogSearchItem {
    pub title: String,
    pub link: String,
    pub bloggername: String,
    pub bloggerlink: String,
    pub description: String,
    pub postdate: String,
}

/// One page of blog search results plus the provider's document total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogSearchPage {
    pub total: u64,
    pub items: Vec<BlogSearchItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankScanResult {
    pub rank: Option<u32>,
    pub doc_total: Option<u64>,
    pub checked_max_rank: u32,
}

/// Rank lookup echoed back with its inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankReport {
    pub keyword: String,
    pub blog_id: String,
    pub rank: Option<u32>,
    pub doc_total: Option<u64>,
    pub checked_max_rank: u32,
}
