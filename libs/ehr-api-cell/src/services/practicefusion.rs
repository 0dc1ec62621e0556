use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{info, warn};

use session_cell::models::Session;
use shared_config::EhrConfig;

use crate::error::EhrApiError;
use crate::services::client::EhrHttpClient;

pub const SCHEDULE_PAGE_SIZE: u32 = 50;

/// Client for the Practice Fusion internal endpoints used by the patient
/// dashboard: paginated schedule report, patient ribbon (insurance),
/// transcript summaries and patient detail.
pub struct PracticeFusionClient {
    http: EhrHttpClient,
    base_url: String,
}

impl PracticeFusionClient {
    pub fn new(config: &EhrConfig, session: &Session) -> Result<Self, EhrApiError> {
        Ok(Self {
            http: EhrHttpClient::for_session(session)?,
            base_url: config.practice_fusion_base_url.clone(),
        })
    }

    /// Fetches scheduled events for the date range, page by page, starting
    /// at page 0 and stopping on the first empty page. A failure on page 0
    /// is an error; a failure on a later page is reported and the pages
    /// already accumulated are returned.
    ///
    /// The range bounds go out as midnight-`Z` strings even though the
    /// vendor reads them as clinic-local (Eastern) wall-clock time. That is
    /// what the vendor expects; do not convert.
    pub async fn fetch_schedule_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Value>, EhrApiError> {
        let payload = json!({
            "startMinimumDateTimeUtc": format!("{}T00:00:00.000Z", start),
            "startMaximumDateTimeUtc": format!("{}T23:59:59.999Z", end),
        });

        let mut events: Vec<Value> = Vec::new();
        let mut page = 0u32;
        loop {
            let url = format!(
                "{}/ScheduleEndpoint/api/v1/Schedule/Report/{}/{}",
                self.base_url, page, SCHEDULE_PAGE_SIZE
            );
            let body = match self.http.post(&url, &payload).await {
                Ok(body) => body,
                Err(err) if page == 0 => return Err(err),
                Err(err) => {
                    warn!(
                        "Schedule report page {} failed, keeping {} events already fetched: {}",
                        page,
                        events.len(),
                        err
                    );
                    break;
                }
            };

            let page_events = body
                .get("scheduledEventList")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if page_events.is_empty() {
                break;
            }
            events.extend(page_events);
            page += 1;
        }

        info!("Fetched {} scheduled events", events.len());
        Ok(events)
    }

    pub async fn fetch_patient_ribbon(&self, patient_guid: &str) -> Result<Value, EhrApiError> {
        let url = format!(
            "{}/PatientEndpoint/api/v1/patients/{}/patientRibbonInfo",
            self.base_url, patient_guid
        );
        self.http.get(&url).await
    }

    pub async fn fetch_transcript_summaries(
        &self,
        patient_guid: &str,
    ) -> Result<Vec<Value>, EhrApiError> {
        let url = format!(
            "{}/ChartingEndpoint/api/v4/patients/{}/transcriptSummaries",
            self.base_url, patient_guid
        );
        let body = self.http.get(&url).await?;
        Ok(body
            .get("transcriptDisplaySummaries")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn fetch_patient_detail(&self, patient_guid: &str) -> Result<Value, EhrApiError> {
        let url = format!(
            "{}/PatientEndpoint/api/v1/patients/{}",
            self.base_url, patient_guid
        );
        self.http.get(&url).await
    }
}
