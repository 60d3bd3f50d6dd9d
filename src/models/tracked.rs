use crate::models::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedKeyword {
    pub id: i64,
    pub blog_id: String,
    pub keyword: String,
    pub project: Option<String>,
    pub created_at: i64,
}

/// Tracked keyword joined with its most recent snapshot, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedKeywordWithLatest {
    #[serde(flatten)]
    pub tracked: TrackedKeyword,
    pub latest: Option<Snapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTrackedResult {
    pub ok: bool,
    pub id: i64,
    pub created: bool,
}
