use crate::error::Result;
use crate::models::search::SearchSort;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_SCHEMA_VERSION: i64 = 1;

pub const DEFAULT_MAX_RANK: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub max_rank: u32,
    pub snapshot_history_limit: u32,
    pub auto_max_posts: usize,
    pub auto_max_candidates: usize,
    pub expand_top_n: usize,
    pub request_timeout: Duration,
    pub search_sort: SearchSort,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        effective_from_value(&default_settings())
    }
}

pub fn get_settings(data_dir: &Path) -> Result<Value> {
    load_settings_from_disk(data_dir)
}

pub fn save_settings(data_dir: &Path, settings: Value) -> Result<Value> {
    save_settings_to_disk(data_dir, settings)
}

pub fn load_effective_settings(data_dir: &Path) -> Result<EffectiveSettings> {
    let settings = load_settings_from_disk(data_dir)?;
    Ok(effective_from_value(&settings))
}

fn effective_from_value(settings: &Value) -> EffectiveSettings {
    let read = |key: &str, min: u64, max: u64, default: u64| {
        settings
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or(default)
            .clamp(min, max)
    };

    EffectiveSettings {
        max_rank: read("maxRank", 1, 1000, DEFAULT_MAX_RANK as u64) as u32,
        snapshot_history_limit: read("snapshotHistoryLimit", 1, 1000, 200) as u32,
        auto_max_posts: read("autoMaxPosts", 1, 200, 50) as usize,
        auto_max_candidates: read("autoMaxCandidates", 1, 200, 50) as usize,
        expand_top_n: read("expandTopN", 1, 200, 50) as usize,
        request_timeout: Duration::from_secs(read("requestTimeoutSecs", 1, 120, 15)),
        search_sort: settings
            .get("searchSort")
            .and_then(Value::as_str)
            .and_then(SearchSort::parse)
            .unwrap_or_default(),
    }
}

pub fn load_settings_from_disk(data_dir: &Path) -> Result<Value> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| json!({}))
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(data_dir: &Path, settings: Value) -> Result<Value> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let mut merged = load_settings_from_disk(data_dir).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

fn ensure_data_dir(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    Ok(())
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<()> {
    let raw = serde_json::to_string_pretty(settings)?;
    fs::write(path, raw)?;
    Ok(())
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    // Version comes from the file itself; defaults would mask unversioned input.
    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 1 {
        // Unversioned files stored the rank ceiling as "defaultMaxRank".
        rename_key(&mut out, "defaultMaxRank", "maxRank");
    }

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "maxRank": DEFAULT_MAX_RANK,
        "snapshotHistoryLimit": 200,
        "autoMaxPosts": 50,
        "autoMaxCandidates": 50,
        "expandTopN": 50,
        "requestTimeoutSecs": 15,
        "searchSort": "sim"
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn rename_key(target: &mut Value, from: &str, to: &str) {
    let Some(obj) = target.as_object_mut() else {
        return;
    };
    if let Some(value) = obj.remove(from) {
        obj.insert(to.to_string(), value);
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "maxRank", 1, 1000, DEFAULT_MAX_RANK as u64);
    clamp_u64(obj, "snapshotHistoryLimit", 1, 1000, 200);
    clamp_u64(obj, "autoMaxPosts", 1, 200, 50);
    clamp_u64(obj, "autoMaxCandidates", 1, 200, 50);
    clamp_u64(obj, "expandTopN", 1, 200, 50);
    clamp_u64(obj, "requestTimeoutSecs", 1, 120, 15);

    sanitize_enum(obj, "searchSort", &["sim", "date"], "sim");
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}
