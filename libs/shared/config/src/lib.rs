use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct EhrConfig {
    pub session_store_url: String,
    pub session_store_api_key: String,
    pub practice_fusion_base_url: String,
    pub tebra_base_url: String,
    pub anthropic_base_url: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub note_signature: String,
}

impl EhrConfig {
    pub fn from_env() -> Self {
        let config = Self {
            session_store_url: env::var("SESSION_STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("SESSION_STORE_URL not set, using empty value");
                    String::new()
                }),
            session_store_api_key: env::var("SESSION_STORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("SESSION_STORE_API_KEY not set, using empty value");
                    String::new()
                }),
            practice_fusion_base_url: env::var("PRACTICE_FUSION_BASE_URL")
                .unwrap_or_else(|_| "https://static.practicefusion.com".to_string()),
            tebra_base_url: env::var("TEBRA_BASE_URL")
                .unwrap_or_else(|_| "https://app.kareo.com".to_string()),
            anthropic_base_url: env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .unwrap_or_else(|_| String::new()),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".to_string()),
            note_signature: env::var("NOTE_SIGNATURE")
                .unwrap_or_else(|_| "Supahealth".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.session_store_url.is_empty()
            && !self.session_store_api_key.is_empty()
    }

    pub fn is_notes_configured(&self) -> bool {
        !self.anthropic_api_key.is_empty()
    }
}
