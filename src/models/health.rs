use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthFeatures {
    pub naver_search: bool,
    pub naver_datalab: bool,
    pub naver_searchad: bool,
    pub database: bool,
    pub cron_secret: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub features: HealthFeatures,
    pub hints: Vec<String>,
}
