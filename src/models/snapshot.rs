use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Ok,
    OkNoSearchad,
    SearchadError,
    NaverSearchError,
}

impl SnapshotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotStatus::Ok => "ok",
            SnapshotStatus::OkNoSearchad => "ok_no_searchad",
            SnapshotStatus::SearchadError => "searchad_error",
            SnapshotStatus::NaverSearchError => "naver_search_error",
        }
    }
}

impl std::fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub tracked_keyword_id: i64,
    pub checked_at: i64,
    pub rank: Option<u32>,
    pub doc_total: Option<u64>,
    pub volume_pc: Option<u64>,
    pub volume_mobile: Option<u64>,
    pub volume_total: Option<u64>,
    pub comp_idx: Option<u64>,
    pub status: Option<String>, // see SnapshotStatus
    pub error: Option<String>,
}

/// Fields of a snapshot row before it is written
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSnapshot {
    pub tracked_keyword_id: i64,
    pub rank: Option<u32>,
    pub doc_total: Option<u64>,
    pub volume_pc: Option<u64>,
    pub volume_mobile: Option<u64>,
    pub volume_total: Option<u64>,
    pub comp_idx: Option<u64>,
    pub status: Option<SnapshotStatus>,
    pub error: Option<String>,
}
