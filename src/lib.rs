pub mod analysis;
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;

use api::naver::NaverSearchClient;
use api::searchad::SearchAdClient;
use api::{BlogSearch, UnconfiguredSearch, VolumeLookup};
use commands::snapshot::{BatchReport, SnapshotRunner};
use commands::{db, settings};
use config::AppConfig;
use error::Result;
use log::{info, warn};

/// The scheduled job: snapshot every tracked keyword once.
///
/// Missing search credentials do not stop the run; each keyword gets a
/// `naver_search_error` snapshot so the gap shows in its history. Fails only
/// when settings or the store cannot be loaded.
pub async fn run_daily(config: &AppConfig) -> Result<BatchReport> {
    let settings = settings::load_effective_settings(&config.data_dir)?;
    let search: Box<dyn BlogSearch> = if config.has_naver_search() {
        Box::new(NaverSearchClient::from_config(config, settings.request_timeout)?)
    } else {
        warn!("Naver search credentials are not configured; scans will be recorded as failed");
        Box::new(UnconfiguredSearch {
            service: "Naver search",
        })
    };
    let searchad = SearchAdClient::from_config(config, settings.request_timeout)?;
    let conn = db::open_database(&config.database_path())?;

    info!(
        "daily snapshot run: maxRank={} searchad={}",
        settings.max_rank,
        searchad.is_some()
    );

    let volume = searchad.as_ref().map(|client| client as &dyn VolumeLookup);
    SnapshotRunner::new(&conn, search.as_ref(), volume)
        .with_sort(settings.search_sort)
        .run_all(settings.max_rank)
        .await
}
