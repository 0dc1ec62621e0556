use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream EHR platform a cached session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Practicefusion,
    Tebra,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Practicefusion => write!(f, "practicefusion"),
            Source::Tebra => write!(f, "tebra"),
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "practicefusion" => Ok(Source::Practicefusion),
            "tebra" => Ok(Source::Tebra),
            other => Err(format!("Unknown source: {}", other)),
        }
    }
}

/// Row shape returned by the sessions table.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRow {
    pub cookie: String,
    pub csrf_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// A pre-authenticated cookie/token pair cached by the external login process.
/// Read-only from the pipeline's perspective.
#[derive(Debug, Clone)]
pub struct Session {
    pub cookie: String,
    pub csrf_token: Option<String>,
    pub source: Source,
    pub expires_at: DateTime<Utc>,
}
