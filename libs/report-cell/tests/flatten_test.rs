use serde_json::json;

use report_cell::models::{InsurancePolicy, InsuranceProfile, NA};
use report_cell::services::flatten::{
    compose_name, flatten_appointment, flatten_scheduled_event, format_date, format_datetime,
    summarize_transcripts,
};

#[test]
fn test_flatten_is_total_on_empty_input() {
    let row = flatten_appointment(&json!({}), None, None, None);

    for field in [
        &row.appointment_id,
        &row.patient_id,
        &row.patient_guid,
        &row.patient_name,
        &row.dob,
        &row.phone,
        &row.provider,
        &row.appointment_type,
        &row.appointment_mode,
        &row.start_time,
        &row.end_time,
        &row.status,
        &row.primary_insurance,
        &row.primary_policy_number,
        &row.secondary_insurance,
        &row.secondary_policy_number,
        &row.transcripts,
    ] {
        assert_eq!(field, NA);
    }
}

#[test]
fn test_flatten_is_pure() {
    let appointment = json!({
        "pmAppointmentId": 101,
        "patientFirstName": "Jane",
        "patientLastName": "Doe",
        "appointmentStart": "2025-08-01T04:00:00.000Z"
    });

    let first = flatten_appointment(&appointment, Some(42), Some("Office"), None);
    let second = flatten_appointment(&appointment, Some(42), Some("Office"), None);
    assert_eq!(first, second);
}

#[test]
fn test_iso_timestamp_flattens_to_date_and_datetime() {
    assert_eq!(format_date("2025-08-01T04:00:00.000Z").as_deref(), Some("2025-08-01"));
    assert_eq!(
        format_datetime("2025-08-01T04:00:00.000Z").as_deref(),
        Some("2025-08-01 04:00:00")
    );
    assert_eq!(format_date("1990-05-10").as_deref(), Some("1990-05-10"));
    assert_eq!(format_date("2025-08-01T04:00:00").as_deref(), Some("2025-08-01"));
}

#[test]
fn test_unparseable_dates_become_na() {
    assert_eq!(format_date("not a date"), None);
    assert_eq!(format_date(""), None);

    let row = flatten_appointment(&json!({"patientDoB": "soonish"}), None, None, None);
    assert_eq!(row.dob, NA);
}

#[test]
fn test_name_composition_and_fallback() {
    assert_eq!(
        compose_name(Some("Jane"), None, Some("Doe")).as_deref(),
        Some("Jane Doe")
    );
    assert_eq!(
        compose_name(Some(" Jane "), Some("Q"), Some("Doe")).as_deref(),
        Some("Jane Q Doe")
    );
    assert_eq!(compose_name(Some(""), None, Some("")), None);

    let row = flatten_appointment(
        &json!({"patientFirstName": "", "patientFullName": "Jane Doe"}),
        None,
        None,
        None,
    );
    assert_eq!(row.patient_name, "Jane Doe");
}

#[test]
fn test_insurance_profile_overrides_coarse_names() {
    let appointment = json!({
        "primaryInsurancePlanName": "Coarse Health",
        "primaryInsurancePolicyNumber": "C-1",
        "secondaryInsurancePlanName": "Coarse Dental"
    });
    let profile = InsuranceProfile {
        primary: Some(InsurancePolicy {
            plan_name: Some("Acme PPO".to_string()),
            policy_number: None,
        }),
        secondary: None,
    };

    let row = flatten_appointment(&appointment, Some(42), None, Some(&profile));
    assert_eq!(row.primary_insurance, "Acme PPO");
    // No policy number in the profile: the coarse one stands.
    assert_eq!(row.primary_policy_number, "C-1");
    // No secondary policy in the profile: the coarse name stands.
    assert_eq!(row.secondary_insurance, "Coarse Dental");
    assert_eq!(row.secondary_policy_number, NA);
}

#[test]
fn test_coarse_names_retained_without_profile() {
    let appointment = json!({
        "primaryInsurancePlanName": "Coarse Health",
        "primaryInsurancePolicyNumber": "C-1"
    });

    let row = flatten_appointment(&appointment, None, None, None);
    assert_eq!(row.patient_id, NA);
    assert_eq!(row.primary_insurance, "Coarse Health");
    assert_eq!(row.primary_policy_number, "C-1");
}

#[test]
fn test_phone_prefers_mobile_then_home() {
    let row = flatten_appointment(
        &json!({"patientHomePhone": "555-0100"}),
        None,
        None,
        None,
    );
    assert_eq!(row.phone, "555-0100");

    let row = flatten_appointment(
        &json!({"patientMobilePhone": "555-0199", "patientHomePhone": "555-0100"}),
        None,
        None,
        None,
    );
    assert_eq!(row.phone, "555-0199");
}

#[test]
fn test_scheduled_event_projection() {
    let event = json!({
        "patientPracticeGuid": "pf-guid-1",
        "patientName": "Jane Doe",
        "providerName": "Dr. Crusher",
        "patientDateOfBirthDateTime": "1990-05-10T00:00:00.000Z",
        "patientMobilePhone": "555-0199",
        "appointmentTypeName": "Follow Up",
        "startAtDateTimeFlt": "08/01/2025 9:00 AM",
        "status": "Confirmed"
    });
    let profile = InsuranceProfile {
        primary: Some(InsurancePolicy {
            plan_name: Some("Acme PPO".to_string()),
            policy_number: Some("P-1".to_string()),
        }),
        secondary: None,
    };

    let row = flatten_scheduled_event(
        &event,
        Some(&profile),
        Some("2025-07-01 - Office Visit"),
        None,
    );

    assert_eq!(row.patient_guid, "pf-guid-1");
    assert_eq!(row.patient_name, "Jane Doe");
    assert_eq!(row.dob, "1990-05-10");
    // Vendor pre-formats this one; it passes through untouched.
    assert_eq!(row.start_time, "08/01/2025 9:00 AM");
    assert_eq!(row.primary_insurance, "Acme PPO");
    assert_eq!(row.primary_policy_number, "P-1");
    assert_eq!(row.transcripts, "2025-07-01 - Office Visit");
    assert_eq!(row.patient_id, NA);
    assert_eq!(row.appointment_mode, NA);
}

#[test]
fn test_phone_backfill_used_when_event_has_none() {
    let row = flatten_scheduled_event(&json!({}), None, None, Some("555-0123"));
    assert_eq!(row.phone, "555-0123");

    let row = flatten_scheduled_event(
        &json!({"patientMobilePhone": "555-0199"}),
        None,
        None,
        Some("555-0123"),
    );
    assert_eq!(row.phone, "555-0199");
}

#[test]
fn test_transcript_summaries_join_with_semicolons() {
    let transcripts = vec![
        json!({"dateOfServiceLocal": "2025-07-01", "encounterTypeEncounterEventTypeName": "Office Visit"}),
        json!({"dateOfServiceLocal": "2025-07-15"}),
    ];

    assert_eq!(
        summarize_transcripts(&transcripts).as_deref(),
        Some("2025-07-01 - Office Visit; 2025-07-15 - N/A")
    );
    assert_eq!(summarize_transcripts(&[]), None);
}
