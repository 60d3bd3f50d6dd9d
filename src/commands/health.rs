use crate::config::AppConfig;
use crate::models::health::{Health, HealthFeatures};

/// Which features are usable with the current configuration, plus a setup
/// hint for each one that is not.
pub fn health_report(config: &AppConfig) -> Health {
    let features = HealthFeatures {
        naver_search: config.has_naver_search(),
        naver_datalab: config.has_naver_search(),
        naver_searchad: config.has_searchad(),
        database: config.database_path().exists(),
        cron_secret: config.cron_secret.is_some(),
    };

    let mut hints = Vec::new();
    if !features.naver_search {
        hints.push(
            "Set NAVER_SEARCH_CLIENT_ID and NAVER_SEARCH_CLIENT_SECRET for rank checks and trends."
                .to_string(),
        );
    }
    if !features.naver_searchad {
        hints.push(
            "Set NAVER_SEARCHAD_API_KEY, NAVER_SEARCHAD_SECRET_KEY and NAVER_SEARCHAD_CUSTOMER_ID \
             for search volume (rank and document totals work without them)."
                .to_string(),
        );
    }
    if !features.database {
        hints.push(format!(
            "No database at {}; it is created on the first snapshot run or tracked keyword.",
            config.database_path().display()
        ));
    }
    if !features.cron_secret {
        hints.push("Set CRON_SECRET to protect the scheduled snapshot trigger.".to_string());
    }

    Health {
        ok: true,
        features,
        hints,
    }
}
