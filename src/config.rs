//! Credentials and paths, built once at startup and passed down explicitly.

use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".rankpulse";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaverSearchCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAdCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub naver_search: Option<NaverSearchCredentials>,
    /// Set only when all three SearchAd values are present
    pub searchad: Option<SearchAdCredentials>,
    pub cron_secret: Option<String>,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// Recognised variables:
    /// - `NAVER_SEARCH_CLIENT_ID`, `NAVER_SEARCH_CLIENT_SECRET`
    /// - `NAVER_SEARCHAD_API_KEY`, `NAVER_SEARCHAD_SECRET_KEY`, `NAVER_SEARCHAD_CUSTOMER_ID`
    /// - `CRON_SECRET`
    /// - `RANKPULSE_DATA_DIR` (default `.rankpulse`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let naver_search = match (
            get("NAVER_SEARCH_CLIENT_ID"),
            get("NAVER_SEARCH_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(NaverSearchCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let searchad = match (
            get("NAVER_SEARCHAD_API_KEY"),
            get("NAVER_SEARCHAD_SECRET_KEY"),
            get("NAVER_SEARCHAD_CUSTOMER_ID"),
        ) {
            (Some(api_key), Some(secret_key), Some(customer_id)) => Some(SearchAdCredentials {
                api_key,
                secret_key,
                customer_id,
            }),
            _ => None,
        };

        let data_dir = get("RANKPULSE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            naver_search,
            searchad,
            cron_secret: get("CRON_SECRET"),
            data_dir,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("state.db")
    }

    pub fn has_naver_search(&self) -> bool {
        self.naver_search.is_some()
    }

    pub fn has_searchad(&self) -> bool {
        self.searchad.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn searchad_requires_all_three_values() {
        let partial = AppConfig::from_lookup(lookup_from(&[
            ("NAVER_SEARCHAD_API_KEY", "key"),
            ("NAVER_SEARCHAD_SECRET_KEY", "secret"),
        ]));
        assert!(!partial.has_searchad());

        let full = AppConfig::from_lookup(lookup_from(&[
            ("NAVER_SEARCHAD_API_KEY", "key"),
            ("NAVER_SEARCHAD_SECRET_KEY", "secret"),
            ("NAVER_SEARCHAD_CUSTOMER_ID", "123"),
        ]));
        assert_eq!(
            full.searchad,
            Some(SearchAdCredentials {
                api_key: "key".to_string(),
                secret_key: "secret".to_string(),
                customer_id: "123".to_string(),
            })
        );
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("NAVER_SEARCH_CLIENT_ID", "id"),
            ("NAVER_SEARCH_CLIENT_SECRET", "   "),
            ("CRON_SECRET", ""),
        ]));
        assert!(!config.has_naver_search());
        assert_eq!(config.cron_secret, None);
        assert_eq!(config.data_dir, PathBuf::from(".rankpulse"));
        assert_eq!(config.database_path(), PathBuf::from(".rankpulse/state.db"));
    }
}
