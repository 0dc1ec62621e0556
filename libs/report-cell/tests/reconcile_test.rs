use serde_json::json;

use report_cell::services::reconcile::{fallback_patient_id, pseudo_id_from_guid, reconcile};

#[test]
fn test_single_object_shape() {
    let bootstrap = json!({
        "body": {
            "results": [
                {
                    "appointmentUuid": "u1",
                    "appointmentMode": "Telehealth",
                    "patientSummary": {"guid": "g1", "patientId": 42}
                }
            ]
        }
    });

    let indices = reconcile(&bootstrap);
    assert_eq!(indices.patient_ids.get("g1"), Some(&42));
    assert_eq!(indices.modes.get("u1").map(String::as_str), Some("Telehealth"));
}

#[test]
fn test_list_of_results_shape() {
    let bootstrap = json!([
        {
            "statusCode": 200,
            "body": {
                "results": [
                    {"appointmentUuid": "u1", "patientSummary": {"guid": "g1", "patientId": 1}}
                ]
            }
        },
        {
            "statusCode": 500,
            "body": {
                "results": [
                    {"appointmentUuid": "u2", "patientSummary": {"guid": "g2", "patientId": 2}}
                ]
            }
        }
    ]);

    let indices = reconcile(&bootstrap);
    // The failed resource is skipped, not fatal.
    assert_eq!(indices.patient_ids.get("g1"), Some(&1));
    assert_eq!(indices.patient_ids.get("g2"), None);
}

#[test]
fn test_malformed_shapes_never_panic_and_yield_empty_indices() {
    let shapes = [
        json!({}),
        json!({"body": {}}),
        json!({"body": {"results": "not-a-list"}}),
        json!({"body": null}),
        json!([{"body": {"results": [null, 7, "text", []]}}]),
        json!("just a string"),
        json!(null),
        json!(12),
    ];

    for shape in &shapes {
        let indices = reconcile(shape);
        assert!(indices.patient_ids.is_empty());
        assert!(indices.modes.is_empty());
    }
}

#[test]
fn test_entries_with_wrong_types_are_skipped() {
    let bootstrap = json!({
        "body": {
            "results": [
                {"appointmentUuid": "u1", "patientSummary": {"guid": 99, "patientId": 1}},
                {"appointmentUuid": "u2", "patientSummary": {"guid": "g2", "patientId": "not-a-number"}},
                {"appointmentUuid": "u3", "patientSummary": "not-an-object"},
                {"appointmentUuid": "u4", "appointmentMode": "Office", "patientSummary": {"guid": "g4", "patientId": 4}}
            ]
        }
    });

    let indices = reconcile(&bootstrap);
    assert_eq!(indices.patient_ids.len(), 1);
    assert_eq!(indices.patient_ids.get("g4"), Some(&4));
    assert_eq!(indices.modes.get("u4").map(String::as_str), Some("Office"));
}

#[test]
fn test_duplicate_keys_last_write_wins() {
    let bootstrap = json!({
        "body": {
            "results": [
                {"appointmentUuid": "u1", "appointmentMode": "Office", "patientSummary": {"guid": "g1", "patientId": 1}},
                {"appointmentUuid": "u1", "appointmentMode": "Telehealth", "patientSummary": {"guid": "g1", "patientId": 2}}
            ]
        }
    });

    let indices = reconcile(&bootstrap);
    assert_eq!(indices.patient_ids.get("g1"), Some(&2));
    assert_eq!(indices.modes.get("u1").map(String::as_str), Some("Telehealth"));
}

#[test]
fn test_fallback_prefers_direct_patient_id_field() {
    let appointment = json!({
        "patientId": 7,
        "patient": {"patientId": 8},
        "patientAccountNumber": "9",
        "patientGuid": "aaaa-bbbb-000a"
    });

    assert_eq!(fallback_patient_id(&appointment), Some(7));
}

#[test]
fn test_fallback_direct_field_may_be_a_numeric_string() {
    let appointment = json!({"patientId": "7"});
    assert_eq!(fallback_patient_id(&appointment), Some(7));
}

#[test]
fn test_fallback_uses_nested_patient_object() {
    let appointment = json!({"patient": {"patientId": 8}, "patientGuid": "aaaa-000a"});
    assert_eq!(fallback_patient_id(&appointment), Some(8));
}

#[test]
fn test_fallback_scans_patient_named_numeric_strings() {
    let appointment = json!({
        "patientAccountNumber": "1234",
        "patientName": "Jane Doe",
        "note": "5678"
    });

    assert_eq!(fallback_patient_id(&appointment), Some(1234));
}

#[test]
fn test_fallback_derives_pseudo_id_from_guid_tail() {
    let appointment = json!({"patientGuid": "3f2c-9a1b-00ff"});
    // 0x00ff
    assert_eq!(fallback_patient_id(&appointment), Some(255));
}

#[test]
fn test_fallback_exhausted_yields_none() {
    let appointment = json!({"providerFullName": "Dr. Who"});
    assert_eq!(fallback_patient_id(&appointment), None);
}

#[test]
fn test_pseudo_id_parses_trailing_hex_segment() {
    assert_eq!(pseudo_id_from_guid("aaaa-bbbb-1f"), Some(31));
    assert_eq!(pseudo_id_from_guid("x-0"), Some(0));
}

#[test]
fn test_pseudo_id_rejects_non_hex_tail_and_dashless_guids() {
    assert_eq!(pseudo_id_from_guid("aaaa-bbbb-zzzz"), None);
    assert_eq!(pseudo_id_from_guid("deadbeef"), None);
    assert_eq!(pseudo_id_from_guid("trailing-dash-"), None);
}
