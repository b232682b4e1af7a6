//! Worker status classification
//!
//! Turns the pool's status document into online/offline worker lists.
//! Pools disagree on field names, so every lookup goes through an ordered
//! list of candidate keys:
//! - worker list: `workers_info`, `workers`, `worker` (array or object)
//! - worker name: `workername`, `worker`, `name`
//! - hashrate: `hashrate1m`, `hashrate_1m`, `hashrate`
//!
//! Nothing here fails. Missing or malformed fields mean "no workers" or
//! "hashrate 0", so a broken record shows up as offline.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Top-level keys that may hold the worker list, by priority
pub const WORKER_LIST_KEYS: &[&str] = &["workers_info", "workers", "worker"];

/// Keys that may hold the compound worker name (`account.worker`)
pub const IDENTITY_KEYS: &[&str] = &["workername", "worker", "name"];

/// Hashrate fields, 1-minute average first
pub const HASHRATE_KEYS: &[&str] = &["hashrate1m", "hashrate_1m", "hashrate"];

/// One worker as seen in this snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStatus {
    pub id: String,
    /// Hashes per second
    pub hashrate: f64,
}

impl WorkerStatus {
    pub fn is_online(&self) -> bool {
        self.hashrate > 0.0
    }
}

/// Partition of the workers of one status document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub workers: Vec<WorkerStatus>,
    pub offline: Vec<String>,
    pub online: Vec<String>,
}

impl Classification {
    pub fn active_count(&self) -> usize {
        self.online.len()
    }

    pub fn offline_count(&self) -> usize {
        self.offline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// Worker records of a status document, in document order.
///
/// The first candidate key holding an array or an object wins; object keys
/// are dropped and only the values kept. Anything else yields no workers.
pub fn normalize_worker_list(document: &Value) -> Vec<&Value> {
    for key in WORKER_LIST_KEYS {
        match document.get(*key) {
            Some(Value::Array(items)) => return items.iter().collect(),
            Some(Value::Object(entries)) => return entries.values().collect(),
            _ => {}
        }
    }
    Vec::new()
}

/// First value among `keys` that is present and not blank.
///
/// Blank means `null`, `false`, an empty string, or an empty array/object.
/// Whitespace-only strings are kept as they are.
pub fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| record.get(*key).filter(|v| !is_blank(v)).map(|v| (*key, v)))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Canonical worker ID: last dot-separated segment of the worker name
pub fn extract_identity(record: &Map<String, Value>) -> String {
    let full = match first_present(record, IDENTITY_KEYS) {
        Some((_, Value::String(s))) => s.clone(),
        Some((_, other)) => other.to_string(),
        None => String::new(),
    };
    match full.rsplit_once('.') {
        Some((_, id)) => id.to_string(),
        None => full,
    }
}

/// Hashrate in H/s, 0.0 when nothing usable is reported.
///
/// Zero-valued candidates are skipped. The first non-zero candidate
/// decides the result even when it does not parse.
pub fn extract_hashrate(record: &Map<String, Value>) -> f64 {
    decisive_hashrate(record).map_or(0.0, |(_, hashrate)| hashrate)
}

// Key of the field that decided the hashrate, with the parsed value
fn decisive_hashrate(record: &Map<String, Value>) -> Option<(&'static str, f64)> {
    for key in HASHRATE_KEYS {
        let Some(raw) = record.get(*key).and_then(raw_text) else {
            continue;
        };
        if raw.is_empty() || plain_number(&raw) == Some(0.0) {
            continue;
        }
        return Some((*key, parse_hashrate(&raw).unwrap_or(0.0)));
    }
    None
}

/// Parse `"1500"`, `"1.5e3"` or `"1.5k"` style values (unit suffix k/m/g/t)
pub fn parse_hashrate(raw: &str) -> Option<f64> {
    let raw = raw.trim().to_ascii_lowercase();
    let value = match plain_number(&raw) {
        Some(v) => v,
        None => {
            let unit = raw.chars().last()?;
            let multiplier = unit_multiplier(unit)?;
            let number = raw[..raw.len() - unit.len_utf8()].trim();
            plain_number(number)? * multiplier
        }
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn unit_multiplier(unit: char) -> Option<f64> {
    match unit {
        'k' => Some(1e3),
        'm' => Some(1e6),
        'g' => Some(1e9),
        't' => Some(1e12),
        _ => None,
    }
}

fn plain_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

// Field value as lowercase text; null counts as absent
fn raw_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_ascii_lowercase()),
        other => Some(other.to_string().to_ascii_lowercase()),
    }
}

/// Classify every worker of `document` as online (hashrate > 0) or offline.
pub fn classify(document: &Value) -> Classification {
    let mut result = Classification::default();

    for entry in normalize_worker_list(document) {
        let Some(record) = entry.as_object() else {
            debug!("Skipping non-object worker entry: {}", entry);
            continue;
        };

        let id = extract_identity(record);
        let decided = decisive_hashrate(record);
        let hashrate = decided.map_or(0.0, |(_, hashrate)| hashrate);
        debug!(
            worker = %id,
            field = ?decided.map(|(key, _)| key),
            raw = ?decided.and_then(|(key, _)| record.get(key)),
            hashrate,
            "Parsed worker hashrate"
        );

        let status = WorkerStatus { id, hashrate };
        if status.is_online() {
            result.online.push(status.id.clone());
        } else {
            result.offline.push(status.id.clone());
        }
        result.workers.push(status);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_absent_list_key_gives_no_workers() {
        let result = classify(&json!({"hashrate1m": "5T", "lastshare": 123}));
        assert!(result.offline.is_empty());
        assert!(result.online.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_non_object_document() {
        assert!(normalize_worker_list(&json!([1, 2, 3])).is_empty());
        assert!(normalize_worker_list(&json!("workers")).is_empty());
        assert!(normalize_worker_list(&Value::Null).is_empty());
    }

    #[test]
    fn test_list_key_priority() {
        let doc = json!({
            "workers": [{"workername": "a.from_workers"}],
            "workers_info": [{"workername": "a.from_info"}],
        });
        let records = normalize_worker_list(&doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["workername"], "a.from_info");
    }

    #[test]
    fn test_malformed_list_value_falls_through() {
        let doc = json!({
            "workers_info": "unavailable",
            "worker": [{"workername": "acct.rig1"}],
        });
        assert_eq!(normalize_worker_list(&doc).len(), 1);
    }

    #[test]
    fn test_map_layout_keeps_document_order() {
        let doc: Value = serde_json::from_str(
            r#"{"workers_info": {"z": {"workername": "a.z"}, "a": {"workername": "a.a"}, "m": {"workername": "a.m"}}}"#,
        )
        .unwrap();
        let result = classify(&doc);
        assert_eq!(result.offline, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_identity_last_segment() {
        assert_eq!(extract_identity(&record(json!({"workername": "pool.worker7"}))), "worker7");
        assert_eq!(extract_identity(&record(json!({"workername": "solo-rig"}))), "solo-rig");
        assert_eq!(extract_identity(&record(json!({"workername": "bc1q.acct.rig3"}))), "rig3");
    }

    #[test]
    fn test_identity_key_fallback() {
        assert_eq!(extract_identity(&record(json!({"workername": "", "worker": "a.b"}))), "b");
        assert_eq!(extract_identity(&record(json!({"workername": null, "name": "c"}))), "c");
        assert_eq!(extract_identity(&record(json!({"hashrate": "1"}))), "");
        assert_eq!(extract_identity(&record(json!({"name": 42}))), "42");
    }

    #[test]
    fn test_whitespace_identity_is_kept() {
        let rec = record(json!({"workername": "   ", "name": "acct.other"}));
        assert_eq!(extract_identity(&rec), "   ");
    }

    #[test]
    fn test_decisive_field_skips_zero_candidates() {
        let rec = record(json!({"hashrate1m": "0", "hashrate_1m": "3k", "hashrate": "9T"}));
        assert_eq!(decisive_hashrate(&rec), Some(("hashrate_1m", 3000.0)));

        let rec = record(json!({"hashrate1m": "slow", "hashrate": "9T"}));
        assert_eq!(decisive_hashrate(&rec), Some(("hashrate1m", 0.0)));

        assert_eq!(decisive_hashrate(&record(json!({"hashrate": "0.0"}))), None);
    }

    #[test]
    fn test_zero_like_hashrates_are_offline() {
        let zeroes = [json!("0"), json!("0.0"), json!(0), json!(0.0), json!(""), Value::Null];
        for zero in zeroes {
            let rec = record(json!({"hashrate1m": zero.clone(), "hashrate_1m": zero.clone(), "hashrate": zero.clone()}));
            assert_eq!(extract_hashrate(&rec), 0.0, "value = {zero}");
        }
        assert_eq!(extract_hashrate(&record(json!({"workername": "x"}))), 0.0);
    }

    #[test]
    fn test_unit_suffixes() {
        let tera = extract_hashrate(&record(json!({"hashrate1m": "1.26t"})));
        assert!((tera - 1.26e12).abs() < 1.0);
        let upper = extract_hashrate(&record(json!({"hashrate1m": "1.26T"})));
        assert_eq!(tera, upper);
        assert_eq!(extract_hashrate(&record(json!({"hashrate1m": "500K"}))), 500e3);
        assert_eq!(extract_hashrate(&record(json!({"hashrate1m": "3.5 G"}))), 3.5e9);
        assert_eq!(extract_hashrate(&record(json!({"hashrate1m": "12m"}))), 12e6);
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(extract_hashrate(&record(json!({"hashrate": 500}))), 500.0);
        assert_eq!(extract_hashrate(&record(json!({"hashrate": "  750.5 "}))), 750.5);
        assert_eq!(extract_hashrate(&record(json!({"hashrate": "1e3"}))), 1000.0);
    }

    #[test]
    fn test_zero_field_falls_through_to_next_key() {
        let rec = record(json!({"hashrate1m": "0", "hashrate_1m": "", "hashrate": "2k"}));
        assert_eq!(extract_hashrate(&rec), 2000.0);
    }

    #[test]
    fn test_unparseable_field_short_circuits() {
        let rec = record(json!({"hashrate1m": "fast", "hashrate": "5T"}));
        assert_eq!(extract_hashrate(&rec), 0.0);

        let rec = record(json!({"hashrate1m": "1.2p", "hashrate": "5T"}));
        assert_eq!(extract_hashrate(&rec), 0.0);
    }

    #[test]
    fn test_negative_and_non_finite_are_zero() {
        assert_eq!(parse_hashrate("-5"), None);
        assert_eq!(parse_hashrate("inf"), None);
        assert_eq!(parse_hashrate("nan"), None);
        assert_eq!(extract_hashrate(&record(json!({"hashrate1m": "-1k"}))), 0.0);
    }

    #[test]
    fn test_parse_hashrate_rejects_garbage() {
        assert_eq!(parse_hashrate(""), None);
        assert_eq!(parse_hashrate("t"), None);
        assert_eq!(parse_hashrate("1.2.3k"), None);
        assert_eq!(parse_hashrate("5h/s"), None);
    }

    #[test]
    fn test_workers_info_map_split() {
        let doc = json!({
            "workers_info": {
                "bc1q.rig1": {"workername": "bc1q.rig1", "hashrate1m": "0"},
                "bc1q.rig2": {"workername": "bc1q.rig2", "hashrate1m": "500"},
            }
        });
        let result = classify(&doc);
        assert_eq!(result.offline, vec!["rig1"]);
        assert_eq!(result.online, vec!["rig2"]);
        assert_eq!(result.workers[1], WorkerStatus { id: "rig2".into(), hashrate: 500.0 });
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let doc = json!({"workers": [
            {"name": "a.x", "hashrate": "1"},
            {"name": "b.x", "hashrate": "1"},
            {"name": "c.y", "hashrate": "0"},
        ]});
        let result = classify(&doc);
        assert_eq!(result.online, vec!["x", "x"]);
        assert_eq!(result.offline, vec!["y"]);
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let doc = json!({"workers": ["rig1", {"name": "a.rig2", "hashrate": "1k"}, 7]});
        let result = classify(&doc);
        assert_eq!(result.workers.len(), 1);
        assert_eq!(result.online, vec!["rig2"]);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let doc = json!({"workers_info": [
            {"workername": "a.r1", "hashrate1m": "1.1T"},
            {"workername": "a.r2", "hashrate1m": "0"},
        ]});
        assert_eq!(classify(&doc), classify(&doc));
    }
}
