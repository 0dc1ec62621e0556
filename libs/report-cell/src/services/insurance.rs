use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tracing::{debug, warn};

use ehr_api_cell::services::TebraClient;

use crate::models::InsuranceProfile;

/// Flat pacing delay between successive insurance calls. A courtesy to the
/// undocumented vendor API, not a backoff policy.
pub const INSURANCE_CALL_DELAY: Duration = Duration::from_millis(100);

/// Fetches billing profiles for the given patient IDs, deduplicated first:
/// N appointments sharing K unique patient IDs issue exactly K upstream
/// calls. A failed or empty profile leaves the patient unenriched; the
/// coarse names on the primary record are retained downstream.
pub async fn fetch_insurance_profiles(
    client: &TebraClient,
    patient_ids: impl IntoIterator<Item = i64>,
) -> HashMap<i64, InsuranceProfile> {
    let unique: BTreeSet<i64> = patient_ids.into_iter().collect();
    debug!("Fetching insurance for {} unique patients", unique.len());

    let mut profiles = HashMap::new();
    let mut first = true;
    for patient_id in unique {
        if !first {
            tokio::time::sleep(INSURANCE_CALL_DELAY).await;
        }
        first = false;

        match client.fetch_billing_profile(patient_id).await {
            Ok(body) => match InsuranceProfile::from_billing_profile(&body) {
                Some(profile) => {
                    profiles.insert(patient_id, profile);
                }
                None => debug!("Billing profile for patient {} carried no policies", patient_id),
            },
            Err(err) => warn!("Insurance unavailable for patient {}: {}", patient_id, err),
        }
    }

    profiles
}
