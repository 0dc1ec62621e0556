use anyhow::{anyhow, Result};
use chrono::Local;
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::EhrConfig;

pub const GENERATED_NOTE_COLUMN: &str = "Generated EHR Note";
pub const NOTE_MAX_TOKENS: u32 = 2000;

const NOTE_FORMAT_EXAMPLE: &str = "\
11/07/2025
Policy is active
Plan type: GEORGIA MEDICAID - ATLANTA/CENTRAL
Copay/Coinsurance: $0
Deductible: $0 / $0 remaining
OOP: $0 / $0 remaining
Visit limits: -2 remaining / 20 visits (22 visits in 2025)
Auth reqd.";

/// Drafts one free-text insurance note per row via the Anthropic messages
/// API. Independent of the fetch pipeline; operates on externally supplied
/// tabular input.
pub struct NoteDrafterService {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
    signature: String,
}

impl NoteDrafterService {
    pub fn new(config: &EhrConfig) -> Result<Self> {
        if !config.is_notes_configured() {
            return Err(anyhow!("ANTHROPIC_API_KEY environment variable not set"));
        }

        Ok(Self {
            http_client: Client::new(),
            base_url: config.anthropic_base_url.clone(),
            api_key: config.anthropic_api_key.clone(),
            model: config.anthropic_model.clone(),
            signature: config.note_signature.clone(),
        })
    }

    /// Builds the single-turn prompt: every non-empty row field as a
    /// `Key: Value` line, plus the fixed format exemplar and instructions.
    pub fn build_prompt(&self, fields: &[(String, String)]) -> String {
        let mut row_context = String::new();
        for (key, value) in fields {
            if value.trim().is_empty() || key == GENERATED_NOTE_COLUMN {
                continue;
            }
            row_context.push_str(key);
            row_context.push_str(": ");
            row_context.push_str(value);
            row_context.push('\n');
        }

        format!(
            "You are an EHR (Electronic Health Record) notes generator. Based on the patient \
insurance and visit data provided, create a concise EHR note following the exact format and \
style shown in the example below.\n\n\
Here is the desired EHR note format:\n\n{example}\n{signature}\n\n\
Now, create an EHR note for the following patient data:\n\n{row_context}\n\
Important guidelines:\n\
1. Follow the EXACT format shown in the example\n\
2. Include today's date at the top ({today} in MM/DD/YYYY format)\n\
3. Extract policy status, plan type, copay, deductible, OOP, visit limits, and authorization requirements\n\
4. Be concise and structured\n\
5. End with \"{signature}\"\n\
6. If any information is missing or not provided, use reasonable defaults or omit that line\n\
7. For visit limits, calculate remaining visits based on available data\n\n\
Generate ONLY the EHR note text, no additional commentary.",
            example = NOTE_FORMAT_EXAMPLE,
            signature = self.signature,
            row_context = row_context,
            today = Local::now().format("%m/%d/%Y"),
        )
    }

    /// Returns the drafted note, or an inline `Error generating note: ...`
    /// string. Failures are per-row; the caller's batch keeps going.
    pub async fn draft_note(&self, fields: &[(String, String)]) -> String {
        let prompt = self.build_prompt(fields);
        match self.request_note(&prompt).await {
            Ok(note) => note,
            Err(err) => {
                warn!("Note generation failed: {}", err);
                format!("Error generating note: {}", err)
            }
        }
    }

    async fn request_note(&self, prompt: &str) -> Result<String> {
        debug!("Requesting note from model {}", self.model);

        let body = json!({
            "model": self.model,
            "max_tokens": NOTE_MAX_TOKENS,
            "messages": [
                {"role": "user", "content": prompt}
            ],
        });

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Anthropic API error: {}", error_text));
        }

        let ai_response: Value = response.json().await?;
        ai_response["content"][0]["text"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| anyhow!("Invalid Anthropic response format"))
    }
}
