use serde::{Deserialize, Serialize};

/// One keyword row from the advertising keyword tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRow {
    pub rel_keyword: String,
    pub monthly_pc_qc_cnt: Option<u64>,
    pub monthly_mobile_qc_cnt: Option<u64>,
    pub monthly_total_qc_cnt: Option<u64>,
    pub comp_idx: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReport {
    pub keyword: String,
    pub item: Option<KeywordRow>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandResult {
    pub seed: String,
    pub items: Vec<KeywordRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureItem {
    pub keyword: String,
    pub rank: Option<u32>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureReport {
    pub ok: bool,
    pub blog_id: String,
    pub max_rank: u32,
    pub items: Vec<ExposureItem>,
}
