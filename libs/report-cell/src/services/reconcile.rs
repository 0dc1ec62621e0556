use serde_json::Value;
use tracing::{debug, warn};

use crate::models::ReconcileIndices;

/// Builds the per-run indices from the secondary calendar feed.
///
/// The feed's top-level shape is polymorphic: either a single object with
/// nested `body.results`, or a list of per-resource result objects, each
/// carrying its own status code and `body.results`. Malformed entries are
/// skipped with a log line; this function never fails. Duplicate keys:
/// last write wins.
pub fn reconcile(bootstrap: &Value) -> ReconcileIndices {
    let mut indices = ReconcileIndices::default();

    match bootstrap {
        Value::Array(resources) => {
            for resource in resources {
                match result_list(resource) {
                    Some(results) => index_results(results, &mut indices),
                    None => debug!("Skipping bootstrap resource without usable results"),
                }
            }
        }
        Value::Object(_) => match result_list(bootstrap) {
            Some(results) => index_results(results, &mut indices),
            None => warn!("Bootstrap response carried no usable results"),
        },
        _ => warn!("Unrecognized bootstrap response shape"),
    }

    indices
}

fn result_list(resource: &Value) -> Option<&Vec<Value>> {
    // Per-resource entries report their own status code.
    if let Some(code) = resource.get("statusCode").and_then(Value::as_i64) {
        if !(200..300).contains(&code) {
            warn!("Skipping bootstrap resource with status {}", code);
            return None;
        }
    }
    resource.get("body")?.get("results")?.as_array()
}

fn index_results(results: &[Value], indices: &mut ReconcileIndices) {
    for record in results {
        let Some(record) = record.as_object() else {
            debug!("Skipping non-object bootstrap record");
            continue;
        };

        let appointment_uuid = record.get("appointmentUuid").and_then(Value::as_str);
        if let (Some(uuid), Some(mode)) = (
            appointment_uuid,
            record.get("appointmentMode").and_then(Value::as_str),
        ) {
            indices.modes.insert(uuid.to_string(), mode.to_string());
        }

        let Some(summary) = record.get("patientSummary").and_then(Value::as_object) else {
            debug!("Bootstrap record has no patient summary");
            continue;
        };
        let (Some(guid), Some(patient_id)) = (
            summary.get("guid").and_then(Value::as_str),
            summary.get("patientId").and_then(Value::as_i64),
        ) else {
            debug!("Patient summary missing guid or patientId");
            continue;
        };

        indices.patient_ids.insert(guid.to_string(), patient_id);
    }
}

/// Degraded patient-ID recovery, used only when the secondary feed is
/// entirely unavailable. Tried in strict order: a direct `patientId` field,
/// a nested patient object's `patientId`, any string field whose name
/// contains "patient" and whose value is purely numeric, and finally a
/// pseudo-ID parsed from the GUID's trailing hexadecimal segment.
pub fn fallback_patient_id(appointment: &Value) -> Option<i64> {
    if let Some(id) = numeric_id(appointment.get("patientId")) {
        return Some(id);
    }

    if let Some(id) = numeric_id(appointment.get("patient").and_then(|p| p.get("patientId"))) {
        return Some(id);
    }

    if let Some(fields) = appointment.as_object() {
        for (name, value) in fields {
            if !name.to_lowercase().contains("patient") {
                continue;
            }
            if let Some(text) = value.as_str() {
                if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                    if let Ok(id) = text.parse() {
                        return Some(id);
                    }
                }
            }
        }
    }

    let guid = appointment.get("patientGuid").and_then(Value::as_str)?;
    pseudo_id_from_guid(guid)
}

/// Derives a pseudo-ID from a patient GUID: split on `-`, take the last
/// segment, parse as base-16. GUIDs without a `-`, or with a non-hex tail,
/// yield no mapping.
pub fn pseudo_id_from_guid(guid: &str) -> Option<i64> {
    if !guid.contains('-') {
        return None;
    }
    let tail = guid.rsplit('-').next()?;
    i64::from_str_radix(tail, 16).ok()
}

fn numeric_id(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
