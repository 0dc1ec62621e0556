use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::models::{FlatRow, InsurancePolicy, InsuranceProfile, NA};

// Projection of raw vendor records into `FlatRow`s. Everything here is
// total and pure: extraction returns options, parse failures are
// swallowed, and "N/A" is applied exactly once, at this boundary.

/// Non-empty string field, trimmed.
pub fn value_str(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// String or number field rendered as text. Used for identifiers that some
/// responses carry as numbers and others as strings.
pub fn value_display(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NA.to_string())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .ok()
}

/// `YYYY-MM-DD`, or `None` when the input is not a recognizable timestamp.
pub fn format_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// `YYYY-MM-DD HH:MM:SS`, or `None` when the input is not a recognizable
/// timestamp.
pub fn format_datetime(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// First/middle/last joined by single spaces, empty parts skipped. `None`
/// when all parts are empty so callers can fall back to a full-name field.
pub fn compose_name(
    first: Option<&str>,
    middle: Option<&str>,
    last: Option<&str>,
) -> Option<String> {
    let name = [first, middle, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// One line per transcript, `date - encounter type`, joined with `"; "`.
/// `None` when there are no transcripts.
pub fn summarize_transcripts(transcripts: &[Value]) -> Option<String> {
    if transcripts.is_empty() {
        return None;
    }
    let lines: Vec<String> = transcripts
        .iter()
        .map(|t| {
            format!(
                "{} - {}",
                na(value_str(t, "dateOfServiceLocal")),
                na(value_str(t, "encounterTypeEncounterEventTypeName"))
            )
        })
        .collect();
    Some(lines.join("; "))
}

fn policy_fields(
    policy: Option<&InsurancePolicy>,
    coarse_plan: Option<String>,
    coarse_number: Option<String>,
) -> (String, String) {
    let plan = policy
        .and_then(|p| p.plan_name.clone())
        .or(coarse_plan);
    let number = policy
        .and_then(|p| p.policy_number.clone())
        .or(coarse_number);
    (na(plan), na(number))
}

/// Flattens one Tebra worklist appointment. Total: any input record,
/// including one with no recognizable fields, yields a fully populated row.
pub fn flatten_appointment(
    appointment: &Value,
    patient_id: Option<i64>,
    mode: Option<&str>,
    insurance: Option<&InsuranceProfile>,
) -> FlatRow {
    let name = compose_name(
        value_str(appointment, "patientFirstName").as_deref(),
        value_str(appointment, "patientMiddleName").as_deref(),
        value_str(appointment, "patientLastName").as_deref(),
    )
    .or_else(|| value_str(appointment, "patientFullName"));

    let (primary_insurance, primary_policy_number) = policy_fields(
        insurance.and_then(|i| i.primary.as_ref()),
        value_str(appointment, "primaryInsurancePlanName"),
        value_str(appointment, "primaryInsurancePolicyNumber"),
    );
    let (secondary_insurance, secondary_policy_number) = policy_fields(
        insurance.and_then(|i| i.secondary.as_ref()),
        value_str(appointment, "secondaryInsurancePlanName"),
        value_str(appointment, "secondaryInsurancePolicyNumber"),
    );

    FlatRow {
        appointment_id: na(value_display(appointment, "pmAppointmentId")),
        patient_id: na(patient_id.map(|id| id.to_string())),
        patient_guid: na(value_str(appointment, "patientGuid")),
        patient_name: na(name),
        dob: na(value_str(appointment, "patientDoB").and_then(|raw| format_date(&raw))),
        phone: na(value_str(appointment, "patientMobilePhone")
            .or_else(|| value_str(appointment, "patientHomePhone"))),
        provider: na(value_str(appointment, "providerFullName")),
        appointment_type: na(value_str(appointment, "appointmentReasonName")),
        appointment_mode: na(mode.map(str::to_owned)),
        start_time: na(
            value_str(appointment, "appointmentStart").and_then(|raw| format_datetime(&raw))
        ),
        end_time: na(value_str(appointment, "appointmentEnd").and_then(|raw| format_datetime(&raw))),
        status: na(value_str(appointment, "appointmentStatus")),
        primary_insurance,
        primary_policy_number,
        secondary_insurance,
        secondary_policy_number,
        transcripts: NA.to_string(),
    }
}

/// Flattens one Practice Fusion scheduled event. The vendor sends
/// `startAtDateTimeFlt` already formatted for display, so it passes through
/// as plain text rather than being re-parsed.
pub fn flatten_scheduled_event(
    event: &Value,
    insurance: Option<&InsuranceProfile>,
    transcripts: Option<&str>,
    phone_backfill: Option<&str>,
) -> FlatRow {
    let (primary_insurance, primary_policy_number) = policy_fields(
        insurance.and_then(|i| i.primary.as_ref()),
        None,
        None,
    );
    let (secondary_insurance, secondary_policy_number) = policy_fields(
        insurance.and_then(|i| i.secondary.as_ref()),
        None,
        None,
    );

    FlatRow {
        appointment_id: na(value_str(event, "appointmentGuid")),
        patient_id: NA.to_string(),
        patient_guid: na(value_str(event, "patientPracticeGuid")),
        patient_name: na(value_str(event, "patientName")),
        dob: na(
            value_str(event, "patientDateOfBirthDateTime").and_then(|raw| format_date(&raw))
        ),
        phone: na(value_str(event, "patientMobilePhone")
            .or_else(|| phone_backfill.map(str::to_owned))),
        provider: na(value_str(event, "providerName")),
        appointment_type: na(value_str(event, "appointmentTypeName")),
        appointment_mode: NA.to_string(),
        start_time: na(value_str(event, "startAtDateTimeFlt")),
        end_time: NA.to_string(),
        status: na(value_str(event, "status")),
        primary_insurance,
        primary_policy_number,
        secondary_insurance,
        secondary_policy_number,
        transcripts: na(transcripts.map(str::to_owned)),
    }
}
