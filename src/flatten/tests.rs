//! Tests for the flatten module

use super::*;
use crate::error::Error;
use chrono::TimeZone;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn flat(pairs: &[(&str, serde_json::Value)]) -> FlatRecord {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ============================================================================
// Basic Flattening
// ============================================================================

#[test]
fn test_flatten_enforcement_record() {
    let record = json!({
        "recall_number": "D-1234-2024",
        "openfda": {"brand_name": "Acme"},
        "report_date": "20240115"
    });

    let out = Flattener::new().flatten(&record).unwrap();

    assert_eq!(
        out,
        flat(&[
            ("openfda_brand_name", json!("Acme")),
            ("recall_number", json!("D-1234-2024")),
            ("report_date", json!("20240115")),
        ])
    );
}

#[test]
fn test_flatten_arrays_as_json_text() {
    let record = json!({
        "recall_number": "F-1234-2024",
        "openfda": {
            "brand_name": ["Test Brand"],
            "manufacturer_name": ["Test Manufacturer"]
        },
        "upc_codes": ["123456789", "987654321"],
        "classification": "Class I"
    });

    let out = Flattener::new().flatten(&record).unwrap();

    assert_eq!(out["openfda_brand_name"], json!("[\"Test Brand\"]"));
    assert_eq!(
        out["openfda_manufacturer_name"],
        json!("[\"Test Manufacturer\"]")
    );
    assert_eq!(out["upc_codes"], json!("[\"123456789\",\"987654321\"]"));
    assert_eq!(out["classification"], json!("Class I"));
}

#[test]
fn test_flatten_arrays_indexed() {
    let record = json!({
        "codes": ["a", "b"],
        "lots": [{"id": 1}, {"id": 2}]
    });

    let out = Flattener::new()
        .with_array_mode(ArrayMode::Indexed)
        .flatten(&record)
        .unwrap();

    assert_eq!(
        out,
        flat(&[
            ("codes_0", json!("a")),
            ("codes_1", json!("b")),
            ("lots_0_id", json!(1)),
            ("lots_1_id", json!(2)),
        ])
    );
}

#[test]
fn test_flatten_custom_separator() {
    let record = json!({"openfda": {"brand_name": "Acme"}});

    let out = Flattener::new().with_separator(".").flatten(&record).unwrap();

    assert_eq!(out, flat(&[("openfda.brand_name", json!("Acme"))]));
}

#[test]
fn test_flatten_scalars_and_nulls_pass_through() {
    let record = json!({
        "a": null,
        "b": true,
        "c": 1.5,
        "d": {"e": null}
    });

    let out = Flattener::new().flatten(&record).unwrap();

    assert_eq!(
        out,
        flat(&[
            ("a", json!(null)),
            ("b", json!(true)),
            ("c", json!(1.5)),
            ("d_e", json!(null)),
        ])
    );
}

// ============================================================================
// Empty Containers
// ============================================================================

#[test_case(json!({"x": {}}) ; "empty object")]
#[test_case(json!({"x": []}) ; "empty array")]
fn test_flatten_empty_container_is_explicit_null(record: serde_json::Value) {
    let out = Flattener::new().flatten(&record).unwrap();
    assert_eq!(out, flat(&[("x", json!(null))]));
}

#[test]
fn test_flatten_empty_array_indexed_is_explicit_null() {
    let out = Flattener::new()
        .with_array_mode(ArrayMode::Indexed)
        .flatten(&json!({"x": []}))
        .unwrap();
    assert_eq!(out, flat(&[("x", json!(null))]));
}

#[test]
fn test_flatten_empty_top_level_object() {
    let out = Flattener::new().flatten(&json!({})).unwrap();
    assert!(out.is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test_case(json!(null) ; "null")]
#[test_case(json!([{"a": 1}]) ; "array")]
#[test_case(json!("text") ; "string")]
fn test_flatten_rejects_non_object(value: serde_json::Value) {
    let err = Flattener::new().flatten(&value).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { .. }));
}

#[test]
fn test_flatten_rejects_colliding_paths() {
    let record = json!({
        "a_b": 1,
        "a": {"b": 2}
    });

    let err = Flattener::new().flatten(&record).unwrap_err();
    match err {
        Error::KeyCollision { key } => assert_eq!(key, "a_b"),
        other => panic!("Expected KeyCollision, got {other:?}"),
    }
}

#[test]
fn test_flatten_indexed_collision_detected() {
    let record = json!({
        "a": [1],
        "a_0": 2
    });

    let err = Flattener::new()
        .with_array_mode(ArrayMode::Indexed)
        .flatten(&record)
        .unwrap_err();
    assert!(err.is_record_level());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_flatten_is_deterministic() {
    let record = json!({
        "z": {"y": [1, {"x": 2}], "w": "v"},
        "a": {"b": {"c": {"d": null}}},
        "m": []
    });
    let flattener = Flattener::new();

    let first = flattener.flatten(&record).unwrap();
    for _ in 0..10 {
        assert_eq!(flattener.flatten(&record).unwrap(), first);
    }
}

#[test]
fn test_flatten_distinct_paths_keep_distinct_keys() {
    let record = json!({
        "openfda": {"brand_name": "A", "generic_name": "B"},
        "brand_name": "C",
        "generic": {"name": "D"}
    });

    let out = Flattener::new().flatten(&record).unwrap();

    // four leaves in, four keys out
    assert_eq!(out.len(), 4);
    assert_eq!(out["openfda_brand_name"], json!("A"));
    assert_eq!(out["openfda_generic_name"], json!("B"));
    assert_eq!(out["brand_name"], json!("C"));
    assert_eq!(out["generic_name"], json!("D"));
}

#[test]
fn test_flatten_deep_nesting_terminates() {
    let depth = 1_000;
    let mut value = json!("leaf");
    for _ in 0..depth {
        value = json!({ "n": value });
    }

    let out = Flattener::new().flatten(&value).unwrap();

    assert_eq!(out.len(), 1);
    let key = out.keys().next().unwrap();
    assert_eq!(key.split('_').count(), depth);
    assert_eq!(out[key], json!("leaf"));
}

// ============================================================================
// Sync Metadata
// ============================================================================

#[test]
fn test_attach_sync_metadata() {
    let mut record = Flattener::new()
        .flatten(&json!({"recall_number": "D-1234-2024"}))
        .unwrap();
    let synced_at = chrono::Utc
        .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
        .unwrap();

    attach_sync_metadata(&mut record, synced_at).unwrap();

    assert_eq!(record[SYNCED_COLUMN], json!("2024-01-15T10:30:00.000Z"));
    assert_eq!(record[DELETED_COLUMN], json!(false));
    assert_eq!(record.len(), 3);
}
