use crate::api::{BlogSearch, VolumeLookup};
use crate::commands::db;
use crate::commands::rank::find_blog_rank;
use crate::error::{Error, Result};
use crate::models::keyword::KeywordRow;
use crate::models::search::{RankScanResult, SearchSort};
use crate::models::snapshot::{NewSnapshot, SnapshotStatus};
use log::{error, info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Outcome of one tracked keyword in a snapshot run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub ok: bool,
    pub tracked_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    fn written(tracked_id: i64, snapshot_id: i64) -> Self {
        Self {
            ok: true,
            tracked_id,
            snapshot_id: Some(snapshot_id),
            error: None,
        }
    }

    fn failed(tracked_id: i64, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            tracked_id,
            snapshot_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub ok: bool,
    pub count: usize,
    pub results: Vec<RunResult>,
}

/// Records one rank/volume observation per tracked keyword.
///
/// `volume` is `None` when SearchAd is not configured.
pub struct SnapshotRunner<'a> {
    conn: &'a Connection,
    search: &'a dyn BlogSearch,
    volume: Option<&'a dyn VolumeLookup>,
    sort: SearchSort,
}

impl<'a> SnapshotRunner<'a> {
    pub fn new(
        conn: &'a Connection,
        search: &'a dyn BlogSearch,
        volume: Option<&'a dyn VolumeLookup>,
    ) -> Self {
        Self {
            conn,
            search,
            volume,
            sort: SearchSort::default(),
        }
    }

    pub fn with_sort(mut self, sort: SearchSort) -> Self {
        self.sort = sort;
        self
    }

    /// Measure one tracked keyword and append a snapshot.
    ///
    /// Scan and volume failures are recorded on the snapshot. A missing
    /// tracked keyword yields `ok: false` without writing anything; store
    /// errors are returned as `Err`.
    pub async fn run_one(&self, tracked_id: i64, max_rank: u32) -> Result<RunResult> {
        let Some(tracked) = db::get_tracked_keyword(self.conn, tracked_id)? else {
            let err = Error::TrackedKeywordNotFound { id: tracked_id };
            warn!("snapshot skipped for {tracked_id}: {err}");
            return Ok(RunResult::failed(tracked_id, err.to_string()));
        };

        let max_rank = max_rank.clamp(1, crate::commands::rank::MAX_RANK_LIMIT);
        let scan = find_blog_rank(
            self.search,
            &tracked.keyword,
            &tracked.blog_id,
            max_rank,
            self.sort,
        );
        let volume = async {
            match self.volume {
                Some(lookup) => Some(lookup.search_volume(&tracked.keyword).await),
                None => None,
            }
        };
        let (scan, volume) = tokio::join!(scan, volume);

        if let Err(e) = &scan {
            warn!("rank scan failed for tracked keyword {tracked_id}: {e}");
        }
        if let Some(Err(e)) = &volume {
            warn!("volume lookup failed for tracked keyword {tracked_id}: {e}");
        }

        let snapshot = compose_snapshot(tracked_id, scan, volume);
        let status = snapshot.status;
        let snapshot_id = db::insert_snapshot(self.conn, &snapshot)?;

        info!(
            "snapshot {snapshot_id} written for tracked keyword {tracked_id} (status={})",
            status.map(|s| s.as_str()).unwrap_or("none")
        );

        Ok(RunResult::written(tracked_id, snapshot_id))
    }

    /// Run each id in order. One id failing never stops the rest.
    pub async fn run_batch(&self, ids: &[i64], max_rank: u32) -> BatchReport {
        let mut results = Vec::with_capacity(ids.len());

        for &id in ids {
            let result = match self.run_one(id, max_rank).await {
                Ok(result) => result,
                Err(e) => {
                    if e.is_persistence() {
                        error!("snapshot store failed for tracked keyword {id}: {e}");
                    } else {
                        warn!("snapshot run for tracked keyword {id} failed: {e}");
                    }
                    RunResult::failed(id, e.to_string())
                }
            };
            results.push(result);
        }

        BatchReport {
            ok: true,
            count: results.len(),
            results,
        }
    }

    /// Snapshot every tracked keyword, oldest id first.
    pub async fn run_all(&self, max_rank: u32) -> Result<BatchReport> {
        let ids = db::list_all_tracked_ids(self.conn)?;
        info!("snapshot run over {} tracked keywords (maxRank={max_rank})", ids.len());
        Ok(self.run_batch(&ids, max_rank).await)
    }
}

/// Status for a (scan, volume) outcome pair; `volume` is `None` when not configured.
pub fn derive_status(scan_ok: bool, volume: Option<bool>) -> SnapshotStatus {
    match (scan_ok, volume) {
        (false, _) => SnapshotStatus::NaverSearchError,
        (true, None) => SnapshotStatus::OkNoSearchad,
        (true, Some(true)) => SnapshotStatus::Ok,
        (true, Some(false)) => SnapshotStatus::SearchadError,
    }
}

fn compose_snapshot(
    tracked_id: i64,
    scan: Result<RankScanResult>,
    volume: Option<Result<Option<KeywordRow>>>,
) -> NewSnapshot {
    let status = derive_status(scan.is_ok(), volume.as_ref().map(|v| v.is_ok()));

    let error = match (&scan, &volume) {
        (Err(scan_err), Some(Err(volume_err))) => Some(format!("{scan_err}; SearchAd: {volume_err}")),
        (Err(scan_err), _) => Some(scan_err.to_string()),
        (Ok(_), Some(Err(volume_err))) => Some(format!("SearchAd: {volume_err}")),
        _ => None,
    };

    let (rank, doc_total) = match &scan {
        Ok(result) => (result.rank, result.doc_total),
        Err(_) => (None, None),
    };

    let row = match volume {
        Some(Ok(Some(row))) => Some(row),
        _ => None,
    };

    NewSnapshot {
        tracked_keyword_id: tracked_id,
        rank,
        doc_total,
        volume_pc: row.as_ref().and_then(|r| r.monthly_pc_qc_cnt),
        volume_mobile: row.as_ref().and_then(|r| r.monthly_mobile_qc_cnt),
        volume_total: row.as_ref().and_then(|r| r.monthly_total_qc_cnt),
        comp_idx: row.as_ref().and_then(|r| r.comp_idx),
        status: Some(status),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::rank::tests::FakeSearch;
    use async_trait::async_trait;

    struct FakeVolume {
        fail: bool,
    }

    #[async_trait]
    impl VolumeLookup for FakeVolume {
        async fn related_keywords(&self, hint: &str) -> Result<Vec<KeywordRow>> {
            if self.fail {
                return Err(Error::provider("SearchAd keywordstool", 401, "bad signature"));
            }
            Ok(vec![KeywordRow {
                rel_keyword: hint.to_string(),
                monthly_pc_qc_cnt: Some(1500),
                monthly_mobile_qc_cnt: None,
                monthly_total_qc_cnt: Some(1500),
                comp_idx: Some(3),
            }])
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        db::initialize_schema(&conn).expect("schema init");
        conn
    }

    fn failing_search() -> FakeSearch {
        let mut search = FakeSearch::with_owner_at(1000, "myblog", None);
        search.fail_at_start = Some(1);
        search
    }

    const SCAN_ERROR: &str = "Naver blog search API error: 500 - boom";

    #[test]
    fn status_table_matches_every_combination() {
        assert_eq!(derive_status(true, None), SnapshotStatus::OkNoSearchad);
        assert_eq!(derive_status(true, Some(true)), SnapshotStatus::Ok);
        assert_eq!(derive_status(true, Some(false)), SnapshotStatus::SearchadError);
        assert_eq!(derive_status(false, None), SnapshotStatus::NaverSearchError);
        assert_eq!(derive_status(false, Some(true)), SnapshotStatus::NaverSearchError);
        assert_eq!(derive_status(false, Some(false)), SnapshotStatus::NaverSearchError);
    }

    #[tokio::test]
    async fn match_with_volume_records_ok_snapshot() {
        let conn = memory_db();
        let tracked = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let search = FakeSearch::with_owner_at(1000, "myblog", Some(243));
        let volume = FakeVolume { fail: false };

        let runner = SnapshotRunner::new(&conn, &search, Some(&volume));
        let result = runner.run_one(tracked.id, 500).await.expect("run");

        assert!(result.ok);
        let snapshots = db::list_snapshots(&conn, tracked.id, 10).expect("list");
        assert_eq!(snapshots.len(), 1);
        let snapshot = &snapshots[0];
        assert_eq!(result.snapshot_id, Some(snapshot.id));
        assert_eq!(snapshot.rank, Some(243));
        assert_eq!(snapshot.doc_total, Some(98_765));
        assert_eq!(snapshot.volume_pc, Some(1500));
        assert_eq!(snapshot.volume_mobile, None);
        assert_eq!(snapshot.volume_total, Some(1500));
        assert_eq!(snapshot.comp_idx, Some(3));
        assert_eq!(snapshot.status.as_deref(), Some("ok"));
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn exhausted_scan_without_searchad_records_no_rank() {
        let conn = memory_db();
        let tracked = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let search = FakeSearch::with_owner_at(1000, "myblog", None);

        let runner = SnapshotRunner::new(&conn, &search, None);
        runner.run_one(tracked.id, 500).await.expect("run");

        let snapshot = &db::list_snapshots(&conn, tracked.id, 10).expect("list")[0];
        assert_eq!(snapshot.rank, None);
        assert_eq!(snapshot.doc_total, Some(98_765));
        assert_eq!(snapshot.volume_total, None);
        assert_eq!(snapshot.status.as_deref(), Some("ok_no_searchad"));
    }

    #[tokio::test]
    async fn scan_failure_still_writes_snapshot() {
        let conn = memory_db();
        let tracked = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let search = failing_search();

        let runner = SnapshotRunner::new(&conn, &search, None);
        let result = runner.run_one(tracked.id, 500).await.expect("run");

        assert!(result.ok);
        let snapshot = &db::list_snapshots(&conn, tracked.id, 10).expect("list")[0];
        assert_eq!(snapshot.rank, None);
        assert_eq!(snapshot.doc_total, None);
        assert_eq!(snapshot.status.as_deref(), Some("naver_search_error"));
        assert_eq!(snapshot.error.as_deref(), Some(SCAN_ERROR));
    }

    #[tokio::test]
    async fn volume_failure_keeps_rank_and_annotates_error() {
        let conn = memory_db();
        let tracked = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let search = FakeSearch::with_owner_at(1000, "myblog", Some(12));
        let volume = FakeVolume { fail: true };

        let runner = SnapshotRunner::new(&conn, &search, Some(&volume));
        runner.run_one(tracked.id, 500).await.expect("run");

        let snapshot = &db::list_snapshots(&conn, tracked.id, 10).expect("list")[0];
        assert_eq!(snapshot.rank, Some(12));
        assert_eq!(snapshot.volume_total, None);
        assert_eq!(snapshot.status.as_deref(), Some("searchad_error"));
        assert_eq!(
            snapshot.error.as_deref(),
            Some("SearchAd: SearchAd keywordstool API error: 401 - bad signature")
        );
    }

    #[tokio::test]
    async fn scan_failure_with_working_volume_is_search_error() {
        let conn = memory_db();
        let tracked = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let search = failing_search();
        let volume = FakeVolume { fail: false };

        let runner = SnapshotRunner::new(&conn, &search, Some(&volume));
        runner.run_one(tracked.id, 500).await.expect("run");

        let snapshot = &db::list_snapshots(&conn, tracked.id, 10).expect("list")[0];
        assert_eq!(snapshot.status.as_deref(), Some("naver_search_error"));
        assert_eq!(snapshot.error.as_deref(), Some(SCAN_ERROR));
        assert_eq!(snapshot.volume_pc, Some(1500));
    }

    #[tokio::test]
    async fn both_failures_concatenate_error_text() {
        let conn = memory_db();
        let tracked = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let search = failing_search();
        let volume = FakeVolume { fail: true };

        let runner = SnapshotRunner::new(&conn, &search, Some(&volume));
        runner.run_one(tracked.id, 500).await.expect("run");

        let snapshot = &db::list_snapshots(&conn, tracked.id, 10).expect("list")[0];
        assert_eq!(snapshot.status.as_deref(), Some("naver_search_error"));
        assert_eq!(
            snapshot.error.as_deref(),
            Some(
                "Naver blog search API error: 500 - boom; SearchAd: SearchAd keywordstool API error: 401 - bad signature"
            )
        );
    }

    #[tokio::test]
    async fn missing_tracked_keyword_writes_nothing() {
        let conn = memory_db();
        let search = FakeSearch::with_owner_at(10, "myblog", None);

        let runner = SnapshotRunner::new(&conn, &search, None);
        let result = runner.run_one(42, 500).await.expect("run");

        assert_eq!(
            result,
            RunResult {
                ok: false,
                tracked_id: 42,
                snapshot_id: None,
                error: Some("tracked keyword not found".to_string()),
            }
        );
        assert!(search.calls().is_empty());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))
            .expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn store_failure_is_returned_not_recorded() {
        let conn = memory_db();
        let first = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let second = db::add_tracked_keyword(&conn, "myblog", "tea", None).expect("add");
        conn.execute_batch("DROP TABLE snapshots;").expect("drop snapshots");
        let search = FakeSearch::with_owner_at(100, "myblog", Some(3));

        let runner = SnapshotRunner::new(&conn, &search, None);
        let err = runner.run_one(first.id, 500).await.unwrap_err();
        assert!(err.is_persistence());
        assert!(err.to_string().contains("no such table: snapshots"));

        let report = runner.run_batch(&[first.id, second.id], 500).await;
        assert!(report.ok);
        assert_eq!(report.count, 2);
        for (result, id) in report.results.iter().zip([first.id, second.id]) {
            assert!(!result.ok);
            assert_eq!(result.tracked_id, id);
            assert_eq!(result.snapshot_id, None);
            assert!(result
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("database error:")));
        }
    }

    #[tokio::test]
    async fn batch_isolates_invalid_ids() {
        let conn = memory_db();
        let first = db::add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let second = db::add_tracked_keyword(&conn, "myblog", "tea", None).expect("add");
        let search = FakeSearch::with_owner_at(300, "myblog", Some(5));

        let runner = SnapshotRunner::new(&conn, &search, None);
        let report = runner.run_batch(&[first.id, 999, second.id], 500).await;

        assert!(report.ok);
        assert_eq!(report.count, 3);
        let oks: Vec<bool> = report.results.iter().map(|r| r.ok).collect();
        assert_eq!(oks, vec![true, false, true]);
        assert_eq!(report.results[1].tracked_id, 999);
        assert_eq!(db::list_snapshots(&conn, second.id, 10).expect("list").len(), 1);
    }

    #[tokio::test]
    async fn run_all_covers_every_tracked_keyword() {
        let conn = memory_db();
        for keyword in ["coffee", "tea", "cake"] {
            db::add_tracked_keyword(&conn, "myblog", keyword, None).expect("add");
        }
        let search = FakeSearch::with_owner_at(100, "myblog", None);

        let runner = SnapshotRunner::new(&conn, &search, None).with_sort(SearchSort::Date);
        let report = runner.run_all(500).await.expect("run all");

        assert_eq!(report.count, 3);
        assert!(report.results.iter().all(|r| r.ok && r.snapshot_id.is_some()));

        let json = serde_json::to_value(&report.results[0]).expect("serialize");
        assert!(json.get("trackedId").is_some());
        assert!(json.get("snapshotId").is_some());
        assert!(json.get("error").is_none());
    }
}
