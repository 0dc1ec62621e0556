use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal fallback used for every missing or malformed datum. Defaulting
/// happens only at the flattening boundary; everything upstream of it
/// returns options.
pub const NA: &str = "N/A";

/// Per-run indices recovered from the secondary calendar feed. Written once
/// during reconciliation, read-only afterwards, discarded with the run.
#[derive(Debug, Clone, Default)]
pub struct ReconcileIndices {
    /// patient GUID -> internal numeric patient ID
    pub patient_ids: HashMap<String, i64>,
    /// appointment UUID -> appointment mode
    pub modes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsurancePolicy {
    pub plan_name: Option<String>,
    pub policy_number: Option<String>,
}

/// Insurance details for one patient, normalized from either vendor's
/// payload shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsuranceProfile {
    pub primary: Option<InsurancePolicy>,
    pub secondary: Option<InsurancePolicy>,
}

impl InsuranceProfile {
    /// Tebra billing profile: `patientCases[0].policies` keyed `"1"`
    /// (primary) and `"2"` (secondary).
    pub fn from_billing_profile(body: &Value) -> Option<Self> {
        let policies = body
            .get("patientCases")?
            .as_array()?
            .first()?
            .get("policies")?;

        let read = |key: &str| {
            policies
                .get(key)
                .and_then(Value::as_object)
                .filter(|policy| !policy.is_empty())
                .map(|policy| InsurancePolicy {
                    plan_name: policy
                        .get("planName")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    policy_number: policy
                        .get("policyNumber")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                })
        };

        let primary = read("1");
        let secondary = read("2");
        if primary.is_none() && secondary.is_none() {
            return None;
        }
        Some(Self { primary, secondary })
    }

    /// Practice Fusion patient ribbon: `primaryInsurancePlan` /
    /// `secondaryInsurancePlan` with `payerName` and `policyIdentifier`.
    pub fn from_ribbon(body: &Value) -> Option<Self> {
        let read = |key: &str| {
            body.get(key)
                .and_then(Value::as_object)
                .filter(|plan| !plan.is_empty())
                .map(|plan| InsurancePolicy {
                    plan_name: plan
                        .get("payerName")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    policy_number: plan
                        .get("policyIdentifier")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                })
        };

        let primary = read("primaryInsurancePlan");
        let secondary = read("secondaryInsurancePlan");
        if primary.is_none() && secondary.is_none() {
            return None;
        }
        Some(Self { primary, secondary })
    }
}

/// The final output record: a fixed set of named scalar fields. Every field
/// always carries a value, either the extracted datum or `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    #[serde(rename = "Appointment ID")]
    pub appointment_id: String,
    #[serde(rename = "Patient ID")]
    pub patient_id: String,
    #[serde(rename = "Patient UID")]
    pub patient_guid: String,
    #[serde(rename = "Patient Name")]
    pub patient_name: String,
    #[serde(rename = "DOB")]
    pub dob: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Provider")]
    pub provider: String,
    #[serde(rename = "Appointment Type")]
    pub appointment_type: String,
    #[serde(rename = "Appointment Mode")]
    pub appointment_mode: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Primary Insurance")]
    pub primary_insurance: String,
    #[serde(rename = "Primary Policy Number")]
    pub primary_policy_number: String,
    #[serde(rename = "Secondary Insurance")]
    pub secondary_insurance: String,
    #[serde(rename = "Secondary Policy Number")]
    pub secondary_policy_number: String,
    #[serde(rename = "All Transcripts")]
    pub transcripts: String,
}
