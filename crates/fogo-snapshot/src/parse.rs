//! Snapshot payload parser.
//!
//! # Contract
//! `parse_snapshot` never fails.  Malformed JSON, a missing/false `success`
//! flag, or a non-array `data` field all yield an **empty** fire map, which
//! the engine interprets as "no fires reported" — the same as a snapshot in
//! which every fire disappeared.  Items without an `id`, non-object items,
//! and items whose typed decode fails are dropped silently.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::record::FireRecord;

/// Parse raw snapshot bytes into a map of fire id → record.
///
/// `None` means the snapshot file was absent at that commit.  The returned
/// map is a `BTreeMap` so per-commit iteration order is deterministic.
pub fn parse_snapshot(bytes: Option<&[u8]>) -> BTreeMap<String, FireRecord> {
    let mut fires = BTreeMap::new();

    let Some(bytes) = bytes else {
        return fires;
    };
    let Ok(root) = serde_json::from_slice::<Value>(bytes) else {
        return fires;
    };
    if root.get("success").and_then(Value::as_bool) != Some(true) {
        return fires;
    }
    let Some(items) = root.get("data").and_then(Value::as_array) else {
        return fires;
    };

    for item in items {
        if !item.is_object() || item.get("id").is_none() {
            continue;
        }
        let Ok(mut rec) = serde_json::from_value::<FireRecord>(item.clone()) else {
            continue;
        };
        rec.raw = item.clone();
        fires.insert(rec.id.clone(), rec);
    }

    fires
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_snapshot_parses_all_items_with_ids() {
        let body = serde_json::json!({
            "success": true,
            "data": [
                {"id": "a", "active": true, "man": 3},
                {"id": "b", "active": false},
                {"noid": true},
                "not-an-object",
            ],
        });
        let fires = parse_snapshot(Some(body.to_string().as_bytes()));
        assert_eq!(fires.len(), 2);
        assert_eq!(fires["a"].man, Some(3));
        assert_eq!(fires["a"].raw["id"], "a");
    }

    #[test]
    fn degenerate_payloads_yield_empty_map() {
        assert!(parse_snapshot(None).is_empty());
        assert!(parse_snapshot(Some(b"not json at all")).is_empty());
        assert!(parse_snapshot(Some(br#"{"success": false, "data": []}"#)).is_empty());
        assert!(parse_snapshot(Some(br#"{"data": []}"#)).is_empty());
        assert!(parse_snapshot(Some(br#"{"success": true, "data": {"id": "a"}}"#)).is_empty());
        assert!(parse_snapshot(Some(br#"[1, 2, 3]"#)).is_empty());
    }
}
