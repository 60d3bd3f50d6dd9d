use crate::api::searchad::top_by_volume;
use crate::api::VolumeLookup;
use crate::error::{Error, Result};
use crate::models::keyword::{ExpandResult, VolumeReport};
use log::info;

const SEARCHAD_NOT_CONFIGURED: &str =
    "SearchAd credentials are not configured; search volume is unavailable";

/// Monthly search volume for a single keyword.
///
/// Without a configured lookup the report carries a note instead of failing.
pub async fn keyword_volume(lookup: Option<&dyn VolumeLookup>, keyword: &str) -> Result<VolumeReport> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::invalid_input("keyword is required"));
    }

    let Some(lookup) = lookup else {
        return Ok(VolumeReport {
            keyword: keyword.to_string(),
            item: None,
            note: Some(SEARCHAD_NOT_CONFIGURED.to_string()),
        });
    };

    let item = lookup.search_volume(keyword).await?;
    Ok(VolumeReport {
        keyword: keyword.to_string(),
        item,
        note: None,
    })
}

/// Related keywords for `seed`, highest total volume first.
pub async fn expand_keywords(
    lookup: Option<&dyn VolumeLookup>,
    seed: &str,
    top_n: usize,
) -> Result<ExpandResult> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(Error::invalid_input("seed is required"));
    }
    let lookup = lookup.ok_or(Error::MissingCredentials { service: "SearchAd" })?;

    let rows = lookup.related_keywords(seed).await?;
    let items = top_by_volume(rows, top_n);
    info!("expanded seed {seed:?} into {} keywords", items.len());

    Ok(ExpandResult {
        seed: seed.to_string(),
        items,
    })
}
