use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE},
    Client, Method,
};
use serde_json::Value;
use tracing::{debug, error, warn};

use session_cell::models::Session;

use crate::error::EhrApiError;

/// Upstream calls get a small bounded retry budget. Only transport errors
/// and 5xx responses are retried; a 4xx is a real answer and surfaces
/// immediately.
pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// HTTP client carrying the cached session materials for one vendor.
/// All calls are sequential; there is no fan-out anywhere in the pipeline.
#[derive(Debug)]
pub struct EhrHttpClient {
    client: Client,
    headers: HeaderMap,
}

impl EhrHttpClient {
    pub fn for_session(session: &Session) -> Result<Self, EhrApiError> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&session.cookie).map_err(|_| EhrApiError::InvalidHeader)?,
        );
        if let Some(token) = session.csrf_token.as_deref() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(token).map_err(|_| EhrApiError::InvalidHeader)?,
            );
        }

        Ok(Self {
            client: Client::new(),
            headers,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, EhrApiError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!("{} {} (attempt {}/{})", method, url, attempt, MAX_ATTEMPTS);

            let mut req = self
                .client
                .request(method.clone(), url)
                .headers(self.headers.clone());
            if let Some(body) = body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.json().await?);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.is_server_error() && attempt < MAX_ATTEMPTS {
                        warn!(
                            "Upstream returned {} for {} (attempt {}/{}), retrying",
                            status, url, attempt, MAX_ATTEMPTS
                        );
                    } else {
                        error!("Upstream error ({}): {}", status, body_text);
                        return Err(EhrApiError::Status {
                            status: status.as_u16(),
                            body: body_text,
                        });
                    }
                }
                Err(err) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(EhrApiError::Http(err));
                    }
                    warn!(
                        "Transport error calling {} (attempt {}/{}): {}",
                        url, attempt, MAX_ATTEMPTS, err
                    );
                }
            }

            tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt - 1)).await;
        }
    }

    pub async fn get(&self, url: &str) -> Result<Value, EhrApiError> {
        self.request(Method::GET, url, None).await
    }

    pub async fn post(&self, url: &str, body: &Value) -> Result<Value, EhrApiError> {
        self.request(Method::POST, url, Some(body)).await
    }

    pub async fn put(&self, url: &str, body: &Value) -> Result<Value, EhrApiError> {
        self.request(Method::PUT, url, Some(body)).await
    }
}
