use chrono::{SecondsFormat, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use tracing::{debug, error, warn};

use shared_config::EhrConfig;

use crate::error::SessionStoreError;
use crate::models::{Session, SessionRow, Source};

/// Read-only client for the sessions table, exposed over a PostgREST-style
/// endpoint. Sessions are written by the external login process; this client
/// only ever selects the freshest eligible row.
pub struct SessionStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SessionStoreClient {
    pub fn new(config: &EhrConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.session_store_url.clone(),
            api_key: config.session_store_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers
    }

    /// Returns the most recently expiring non-expired session for `source`,
    /// or `None` when no row qualifies. A missing session is a terminal,
    /// user-visible condition for the current run; no re-authentication is
    /// attempted here.
    pub async fn get_latest_session(
        &self,
        source: Source,
    ) -> Result<Option<Session>, SessionStoreError> {
        // `Z` suffix keeps the timestamp free of `+`, which would be eaten
        // by query-string decoding.
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = format!(
            "{}/rest/v1/sessions?select=cookie,csrf_token,expires_at&source=eq.{}&expires_at=gt.{}&order=expires_at.desc&limit=1",
            self.base_url, source, now
        );
        debug!("Fetching latest session for {}", source);

        let response = self
            .client
            .get(&url)
            .headers(self.get_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Session store error ({}): {}", status, body);
            return Err(SessionStoreError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<SessionRow> = response.json().await?;
        match rows.into_iter().next() {
            Some(row) => {
                debug!("Got session for {} expiring at {}", source, row.expires_at);
                Ok(Some(Session {
                    cookie: row.cookie,
                    csrf_token: row.csrf_token,
                    source,
                    expires_at: row.expires_at,
                }))
            }
            None => {
                warn!("No eligible session found for {}", source);
                Ok(None)
            }
        }
    }
}
