use crate::error::{Error, Result};
use crate::models::snapshot::{NewSnapshot, Snapshot};
use crate::models::tracked::{AddTrackedResult, TrackedKeyword, TrackedKeywordWithLatest};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const DB_SCHEMA_VERSION: i64 = 2;

const SNAPSHOT_COLUMNS: &str = "id, tracked_keyword_id, checked_at, rank, doc_total, volume_pc, volume_mobile, volume_total, comp_idx, status, error";

pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; do not fail reads/writes for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tracked_keywords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            blog_id TEXT NOT NULL,
            keyword TEXT NOT NULL,
            project TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE(blog_id, keyword)
        );

        CREATE TABLE IF NOT EXISTS snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tracked_keyword_id INTEGER NOT NULL REFERENCES tracked_keywords(id) ON DELETE CASCADE,
            checked_at INTEGER NOT NULL,
            rank INTEGER,
            doc_total INTEGER,
            volume_pc INTEGER,
            volume_mobile INTEGER,
            volume_total INTEGER,
            comp_idx INTEGER,
            status TEXT,
            error TEXT
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_snapshots_tracked_checked ON snapshots(tracked_keyword_id, checked_at);
        CREATE INDEX IF NOT EXISTS idx_tracked_keywords_project ON tracked_keywords(project);
        ",
    )
}

pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

pub fn add_tracked_keyword(
    conn: &Connection,
    blog_id: &str,
    keyword: &str,
    project: Option<&str>,
) -> Result<AddTrackedResult> {
    let blog_id = blog_id.trim();
    let keyword = keyword.trim();

    if blog_id.is_empty() || keyword.is_empty() {
        return Err(Error::invalid_input("blogId and keyword are required"));
    }

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM tracked_keywords WHERE blog_id = ?1 AND keyword = ?2 LIMIT 1",
            params![blog_id, keyword],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(AddTrackedResult {
            ok: true,
            id,
            created: false,
        });
    }

    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO tracked_keywords (blog_id, keyword, project, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![blog_id, keyword, project, now],
    )?;

    Ok(AddTrackedResult {
        ok: true,
        id: conn.last_insert_rowid(),
        created: true,
    })
}

pub fn get_tracked_keyword(conn: &Connection, id: i64) -> Result<Option<TrackedKeyword>> {
    let tracked = conn
        .query_row(
            "SELECT id, blog_id, keyword, project, created_at FROM tracked_keywords WHERE id = ?1",
            params![id],
            tracked_from_row,
        )
        .optional()?;
    Ok(tracked)
}

pub fn list_all_tracked_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM tracked_keywords ORDER BY id ASC")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

pub fn list_tracked_keywords_with_latest(conn: &Connection) -> Result<Vec<TrackedKeywordWithLatest>> {
    let mut stmt = conn.prepare(
        "
        SELECT
            tk.id, tk.blog_id, tk.keyword, tk.project, tk.created_at,
            s.id, s.tracked_keyword_id, s.checked_at, s.rank, s.doc_total,
            s.volume_pc, s.volume_mobile, s.volume_total, s.comp_idx, s.status, s.error
        FROM tracked_keywords tk
        LEFT JOIN snapshots s ON s.id = (
            SELECT latest.id FROM snapshots latest
            WHERE latest.tracked_keyword_id = tk.id
            ORDER BY latest.checked_at DESC, latest.id DESC
            LIMIT 1
        )
        ORDER BY tk.project IS NULL, tk.project ASC, tk.created_at DESC, tk.id DESC
        ",
    )?;

    let items = stmt
        .query_map([], |row| {
            let tracked = tracked_from_row(row)?;
            let snapshot_id: Option<i64> = row.get(5)?;
            let latest = match snapshot_id {
                Some(id) => Some(Snapshot {
                    id,
                    tracked_keyword_id: row.get(6)?,
                    checked_at: row.get(7)?,
                    rank: row.get(8)?,
                    doc_total: row.get::<_, Option<i64>>(9)?.map(|v| v as u64),
                    volume_pc: row.get::<_, Option<i64>>(10)?.map(|v| v as u64),
                    volume_mobile: row.get::<_, Option<i64>>(11)?.map(|v| v as u64),
                    volume_total: row.get::<_, Option<i64>>(12)?.map(|v| v as u64),
                    comp_idx: row.get::<_, Option<i64>>(13)?.map(|v| v as u64),
                    status: row.get(14)?,
                    error: row.get(15)?,
                }),
                None => None,
            };
            Ok(TrackedKeywordWithLatest { tracked, latest })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(items)
}

pub fn insert_snapshot(conn: &Connection, snapshot: &NewSnapshot) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "
        INSERT INTO snapshots (
            tracked_keyword_id,
            checked_at,
            rank,
            doc_total,
            volume_pc,
            volume_mobile,
            volume_total,
            comp_idx,
            status,
            error
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ",
        params![
            snapshot.tracked_keyword_id,
            now,
            snapshot.rank,
            snapshot.doc_total.map(|v| v as i64),
            snapshot.volume_pc.map(|v| v as i64),
            snapshot.volume_mobile.map(|v| v as i64),
            snapshot.volume_total.map(|v| v as i64),
            snapshot.comp_idx.map(|v| v as i64),
            snapshot.status.map(|s| s.as_str()),
            snapshot.error.as_deref(),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn list_snapshots(conn: &Connection, tracked_id: i64, limit: u32) -> Result<Vec<Snapshot>> {
    let limit = limit.clamp(1, 1000);
    let mut stmt = conn.prepare(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE tracked_keyword_id = ?1 ORDER BY checked_at DESC, id DESC LIMIT ?2"
    ))?;

    let snapshots = stmt
        .query_map(params![tracked_id, limit], snapshot_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(snapshots)
}

pub fn delete_tracked_keyword(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM tracked_keywords WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

fn tracked_from_row(row: &Row<'_>) -> rusqlite::Result<TrackedKeyword> {
    Ok(TrackedKeyword {
        id: row.get(0)?,
        blog_id: row.get(1)?,
        keyword: row.get(2)?,
        project: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        id: row.get(0)?,
        tracked_keyword_id: row.get(1)?,
        checked_at: row.get(2)?,
        rank: row.get(3)?,
        doc_total: row.get::<_, Option<i64>>(4)?.map(|v| v as u64),
        volume_pc: row.get::<_, Option<i64>>(5)?.map(|v| v as u64),
        volume_mobile: row.get::<_, Option<i64>>(6)?.map(|v| v as u64),
        volume_total: row.get::<_, Option<i64>>(7)?.map(|v| v as u64),
        comp_idx: row.get::<_, Option<i64>>(8)?.map(|v| v as u64),
        status: row.get(9)?,
        error: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::SnapshotStatus;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        initialize_schema(&conn).expect("schema init");
        conn
    }

    #[test]
    fn schema_initializes_with_expected_version() {
        let conn = memory_db();
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("schema version");
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn add_tracked_keyword_is_idempotent_on_blog_and_keyword() {
        let conn = memory_db();

        let first = add_tracked_keyword(&conn, " myblog ", "coffee ", Some("cafe"))
            .expect("add first");
        assert!(first.created);

        let second = add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add again");
        assert!(!second.created);
        assert_eq!(second.id, first.id);

        let tracked = get_tracked_keyword(&conn, first.id)
            .expect("read")
            .expect("tracked exists");
        assert_eq!(tracked.blog_id, "myblog");
        assert_eq!(tracked.keyword, "coffee");
        assert_eq!(tracked.project.as_deref(), Some("cafe"));
    }

    #[test]
    fn add_tracked_keyword_rejects_blank_fields() {
        let conn = memory_db();
        let err = add_tracked_keyword(&conn, "  ", "coffee", None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn snapshot_round_trip_preserves_nullable_fields() {
        let conn = memory_db();
        let tracked = add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");

        let id = insert_snapshot(
            &conn,
            &NewSnapshot {
                tracked_keyword_id: tracked.id,
                rank: Some(243),
                doc_total: Some(120_000),
                volume_pc: None,
                volume_mobile: Some(900),
                volume_total: Some(900),
                comp_idx: None,
                status: Some(SnapshotStatus::Ok),
                error: None,
            },
        )
        .expect("insert snapshot");

        let snapshots = list_snapshots(&conn, tracked.id, 10).expect("list snapshots");
        assert_eq!(snapshots.len(), 1);
        let snapshot = &snapshots[0];
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.rank, Some(243));
        assert_eq!(snapshot.doc_total, Some(120_000));
        assert_eq!(snapshot.volume_pc, None);
        assert_eq!(snapshot.volume_mobile, Some(900));
        assert_eq!(snapshot.status.as_deref(), Some("ok"));
        assert_eq!(snapshot.error, None);
    }

    #[test]
    fn snapshots_list_newest_first_and_latest_is_joined() {
        let conn = memory_db();
        let tracked = add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        let untracked = add_tracked_keyword(&conn, "myblog", "tea", Some("drinks")).expect("add");

        let older = insert_snapshot(
            &conn,
            &NewSnapshot {
                tracked_keyword_id: tracked.id,
                rank: Some(10),
                status: Some(SnapshotStatus::OkNoSearchad),
                ..NewSnapshot::default()
            },
        )
        .expect("insert older");
        let newer = insert_snapshot(
            &conn,
            &NewSnapshot {
                tracked_keyword_id: tracked.id,
                rank: Some(4),
                status: Some(SnapshotStatus::OkNoSearchad),
                ..NewSnapshot::default()
            },
        )
        .expect("insert newer");

        let history = list_snapshots(&conn, tracked.id, 200).expect("history");
        let ids: Vec<i64> = history.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer, older]);

        let listed = list_tracked_keywords_with_latest(&conn).expect("list with latest");
        assert_eq!(listed.len(), 2);
        // Projects sort before unlabelled rows.
        assert_eq!(listed[0].tracked.id, untracked.id);
        assert!(listed[0].latest.is_none());
        assert_eq!(listed[1].latest.as_ref().map(|s| s.id), Some(newer));
    }

    #[test]
    fn deleting_tracked_keyword_cascades_to_snapshots() {
        let conn = memory_db();
        let tracked = add_tracked_keyword(&conn, "myblog", "coffee", None).expect("add");
        insert_snapshot(
            &conn,
            &NewSnapshot {
                tracked_keyword_id: tracked.id,
                ..NewSnapshot::default()
            },
        )
        .expect("insert");

        assert!(delete_tracked_keyword(&conn, tracked.id).expect("delete"));
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))
            .expect("count");
        assert_eq!(remaining, 0);
        assert_eq!(list_all_tracked_ids(&conn).expect("ids"), Vec::<i64>::new());
    }

    #[test]
    fn snapshot_for_missing_tracked_keyword_is_rejected() {
        let conn = memory_db();
        let err = insert_snapshot(
            &conn,
            &NewSnapshot {
                tracked_keyword_id: 99,
                ..NewSnapshot::default()
            },
        )
        .unwrap_err();
        assert!(err.is_persistence());
    }
}
