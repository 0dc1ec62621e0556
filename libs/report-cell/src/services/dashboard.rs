use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use ehr_api_cell::services::{PracticeFusionClient, TebraClient};
use session_cell::models::Session;
use shared_config::EhrConfig;

use crate::models::{FlatRow, InsuranceProfile};
use crate::services::flatten::{
    flatten_appointment, flatten_scheduled_event, summarize_transcripts, value_str,
};
use crate::services::insurance::{fetch_insurance_profiles, INSURANCE_CALL_DELAY};
use crate::services::reconcile::{fallback_patient_id, reconcile};

/// Tebra appointment dashboard: bulk worklist fetch, calendar-bootstrap
/// reconciliation, billing-profile enrichment, flatten. Fully sequential;
/// per-run indices are written once and read-only afterwards.
pub struct AppointmentDashboardService {
    tebra: TebraClient,
}

impl AppointmentDashboardService {
    pub fn new(config: &EhrConfig, session: &Session) -> Result<Self> {
        Ok(Self {
            tebra: TebraClient::new(config, session)?,
        })
    }

    pub async fn run(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<FlatRow>> {
        let appointments = self.tebra.fetch_appointments(start, end).await?;

        // The bootstrap feed is the authoritative patient-ID source. Only
        // when it is entirely unavailable do the per-record fallbacks run.
        let indices = match self.tebra.fetch_calendar_bootstrap(start, end).await {
            Ok(bootstrap) => Some(reconcile(&bootstrap)),
            Err(err) => {
                warn!(
                    "Calendar bootstrap unavailable, falling back to appointment fields: {}",
                    err
                );
                None
            }
        };

        let patient_ids: Vec<Option<i64>> = appointments
            .iter()
            .map(|appointment| match &indices {
                Some(indices) => appointment
                    .get("patientGuid")
                    .and_then(Value::as_str)
                    .and_then(|guid| indices.patient_ids.get(guid).copied()),
                None => fallback_patient_id(appointment),
            })
            .collect();

        let profiles =
            fetch_insurance_profiles(&self.tebra, patient_ids.iter().flatten().copied()).await;

        let rows = appointments
            .iter()
            .zip(&patient_ids)
            .map(|(appointment, patient_id)| {
                let mode = indices.as_ref().and_then(|indices| {
                    appointment
                        .get("appointmentUuid")
                        .and_then(Value::as_str)
                        .and_then(|uuid| indices.modes.get(uuid))
                        .map(String::as_str)
                });
                let insurance = patient_id.and_then(|id| profiles.get(&id));
                flatten_appointment(appointment, *patient_id, mode, insurance)
            })
            .collect();

        info!("Built {} appointment rows", appointments.len());
        Ok(rows)
    }
}

/// Practice Fusion patient dashboard: paginated schedule report, then
/// per-patient insurance ribbon and transcript summaries, then flatten.
pub struct PatientDashboardService {
    practice_fusion: PracticeFusionClient,
}

impl PatientDashboardService {
    pub fn new(config: &EhrConfig, session: &Session) -> Result<Self> {
        Ok(Self {
            practice_fusion: PracticeFusionClient::new(config, session)?,
        })
    }

    pub async fn run(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<FlatRow>> {
        let events = self.practice_fusion.fetch_schedule_report(start, end).await?;

        // One lookup per unique patient, paced like the insurance loop.
        // A failed lookup degrades that patient to coarse data.
        let guids: BTreeSet<String> = events
            .iter()
            .filter_map(|event| event.get("patientPracticeGuid").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();

        let mut insurance: HashMap<String, InsuranceProfile> = HashMap::new();
        let mut transcripts: HashMap<String, String> = HashMap::new();
        let mut first = true;
        for guid in &guids {
            if !first {
                tokio::time::sleep(INSURANCE_CALL_DELAY).await;
            }
            first = false;

            match self.practice_fusion.fetch_patient_ribbon(guid).await {
                Ok(body) => {
                    if let Some(profile) = InsuranceProfile::from_ribbon(&body) {
                        insurance.insert(guid.clone(), profile);
                    }
                }
                Err(err) => warn!("Insurance ribbon unavailable for patient {}: {}", guid, err),
            }

            match self.practice_fusion.fetch_transcript_summaries(guid).await {
                Ok(items) => {
                    if let Some(summary) = summarize_transcripts(&items) {
                        transcripts.insert(guid.clone(), summary);
                    }
                }
                Err(err) => warn!("Transcripts unavailable for patient {}: {}", guid, err),
            }
        }

        let mut rows = Vec::with_capacity(events.len());
        for event in &events {
            let guid = event.get("patientPracticeGuid").and_then(Value::as_str);

            let phone_backfill = if value_str(event, "patientMobilePhone").is_none() {
                match guid {
                    Some(guid) => self.lookup_phone(guid).await,
                    None => None,
                }
            } else {
                None
            };

            rows.push(flatten_scheduled_event(
                event,
                guid.and_then(|g| insurance.get(g)),
                guid.and_then(|g| transcripts.get(g)).map(String::as_str),
                phone_backfill.as_deref(),
            ));
        }

        info!("Built {} patient rows", rows.len());
        Ok(rows)
    }

    async fn lookup_phone(&self, guid: &str) -> Option<String> {
        match self.practice_fusion.fetch_patient_detail(guid).await {
            Ok(detail) => {
                value_str(&detail, "mobilePhone").or_else(|| value_str(&detail, "homePhone"))
            }
            Err(err) => {
                warn!("Patient detail unavailable for {}: {}", guid, err);
                None
            }
        }
    }
}
