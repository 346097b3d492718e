//! Change classifier: does a fire differ from its previously tracked state?
//!
//! # Invariants
//! - Either side absent ⇒ always a difference (covers NEW and cold-seed
//!   misses).
//! - Only tracked fields count; any other churn in the payload is invisible.
//! - `updated.sec` governs when either side carries `updated`; only when
//!   neither does is `dateTime.sec` compared instead.

use crate::record::FireRecord;

/// `true` when the two observations differ in any tracked dimension.
pub fn differs(prev: Option<&FireRecord>, cur: Option<&FireRecord>) -> bool {
    let (Some(p), Some(c)) = (prev, cur) else {
        return true;
    };

    // Exact equality on coordinates is intentional: any numeric churn in the
    // feed is a reportable change.
    #[allow(clippy::float_cmp)]
    let tracked_mismatch = p.lat != c.lat
        || p.lng != c.lng
        || p.location != c.location
        || p.man != c.man
        || p.terrain != c.terrain
        || p.aerial != c.aerial
        || p.meios_aquaticos != c.meios_aquaticos
        || p.status != c.status
        || p.status_code != c.status_code
        || p.natureza != c.natureza
        || p.active != c.active
        || p.localidade != c.localidade
        || p.important != c.important
        || p.district != c.district
        || p.concelho != c.concelho
        || p.freguesia != c.freguesia
        || p.natureza_code != c.natureza_code
        || p.status_color != c.status_color;

    if tracked_mismatch {
        return true;
    }

    if p.updated.is_some() || c.updated.is_some() {
        return p.updated.map(|u| u.sec) != c.updated.map(|u| u.sec);
    }
    p.date_time.map(|d| d.sec) != c.date_time.map(|d| d.sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(v: serde_json::Value) -> FireRecord {
        serde_json::from_value(v).expect("test record decodes")
    }

    #[test]
    fn absent_side_always_differs() {
        let r = rec(serde_json::json!({"id": "f1"}));
        assert!(differs(None, Some(&r)));
        assert!(differs(Some(&r), None));
        assert!(differs(None, None));
    }

    #[test]
    fn tracked_field_change_is_a_difference() {
        let a = rec(serde_json::json!({"id": "f1", "man": 5, "active": true}));
        let b = rec(serde_json::json!({"id": "f1", "man": 6, "active": true}));
        assert!(differs(Some(&a), Some(&b)));
    }

    #[test]
    fn untracked_field_change_is_invisible() {
        let a = rec(serde_json::json!({
            "id": "f1", "active": true, "icon": "flame-red",
            "dateTime": {"sec": 100},
        }));
        let b = rec(serde_json::json!({
            "id": "f1", "active": true, "icon": "flame-blue",
            "dateTime": {"sec": 100},
        }));
        assert!(!differs(Some(&a), Some(&b)));
    }

    #[test]
    fn updated_sec_governs_when_present_on_either_side() {
        let a = rec(serde_json::json!({
            "id": "f1", "updated": {"sec": 100}, "dateTime": {"sec": 1},
        }));
        let b = rec(serde_json::json!({
            "id": "f1", "updated": {"sec": 100}, "dateTime": {"sec": 2},
        }));
        // updated matches; the dateTime drift is ignored.
        assert!(!differs(Some(&a), Some(&b)));

        let c = rec(serde_json::json!({
            "id": "f1", "updated": {"sec": 101}, "dateTime": {"sec": 1},
        }));
        assert!(differs(Some(&a), Some(&c)));

        // One side lost its `updated` object entirely: a difference.
        let d = rec(serde_json::json!({"id": "f1", "dateTime": {"sec": 1}}));
        assert!(differs(Some(&a), Some(&d)));
    }

    #[test]
    fn date_time_is_the_fallback_when_neither_side_has_updated() {
        let a = rec(serde_json::json!({"id": "f1", "dateTime": {"sec": 1}}));
        let b = rec(serde_json::json!({"id": "f1", "dateTime": {"sec": 2}}));
        assert!(differs(Some(&a), Some(&b)));
        assert!(!differs(Some(&a), Some(&a.clone())));
    }
}
