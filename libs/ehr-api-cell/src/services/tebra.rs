use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use tracing::info;

use session_cell::models::Session;
use shared_config::EhrConfig;

use crate::error::EhrApiError;
use crate::services::client::EhrHttpClient;

/// Single bulk request instead of paging; the worklist endpoint accepts a
/// page-size ceiling large enough to cover any realistic date range.
pub const APPOINTMENT_PAGE_CEILING: u32 = 50_000;

/// Client for the Tebra/Kareo internal endpoints: bulk appointment worklist,
/// calendar bootstrap feed and per-patient billing profile.
pub struct TebraClient {
    http: EhrHttpClient,
    base_url: String,
}

/// Wall-clock time encoded as if it were UTC. The worklist endpoint expects
/// exactly this naive epoch-millisecond arithmetic; do not make it
/// timezone-aware.
fn naive_epoch_millis(date: NaiveDate, time: NaiveTime) -> i64 {
    date.and_time(time).and_utc().timestamp_millis()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

impl TebraClient {
    pub fn new(config: &EhrConfig, session: &Session) -> Result<Self, EhrApiError> {
        Ok(Self {
            http: EhrHttpClient::for_session(session)?,
            base_url: config.tebra_base_url.clone(),
        })
    }

    pub async fn fetch_appointments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Value>, EhrApiError> {
        let payload = json!({
            "orderByList": [],
            "pageSize": APPOINTMENT_PAGE_CEILING,
            "currentPage": 0,
            "pmAppointmentId": null,
            "startDate": naive_epoch_millis(start, NaiveTime::MIN),
            "endDate": naive_epoch_millis(end, end_of_day()),
            "patientGuid": null,
            "providerGuids": null,
            "serviceLocationGuids": [],
            "appointmentReasonGuids": [],
            "ehrAppointmentStatuses": null,
            "groupAppointment": null,
            "matchedCharge": null,
            "linkedCharge": null,
            "primaryInsurancePlanGuids": [],
            "secondaryInsurancePlanGuids": [],
            "pmPayerScenarioIds": [],
            "patientHomePhone": null,
            "patientMobilePhone": null,
            "copayList": null,
            "practiceTimezone": "America/New_York",
        });

        let url = format!("{}/worklist-ui/api/appointments/base", self.base_url);
        let body = self.http.post(&url, &payload).await?;

        let appointments = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        info!("Fetched {} appointments", appointments.len());
        Ok(appointments)
    }

    /// Fetches the secondary calendar feed carrying per-appointment patient
    /// summaries. The response shape is polymorphic; callers hand the raw
    /// body to the reconciler as-is.
    pub async fn fetch_calendar_bootstrap(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, EhrApiError> {
        let descriptor = json!({
            "resources": [
                {
                    "name": "appointments",
                    "query": {
                        "startDate": naive_epoch_millis(start, NaiveTime::MIN),
                        "endDate": naive_epoch_millis(end, end_of_day()),
                        "includePatientSummary": true,
                    },
                },
            ],
        });

        let url = format!("{}/calendar-ui/api/v1/bootstrap", self.base_url);
        self.http.put(&url, &descriptor).await
    }

    pub async fn fetch_billing_profile(&self, patient_id: i64) -> Result<Value, EhrApiError> {
        let url = format!(
            "{}/billing-ui/api/patients/{}/billing-profile",
            self.base_url, patient_id
        );
        self.http.get(&url).await
    }
}
