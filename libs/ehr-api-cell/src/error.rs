use thiserror::Error;

#[derive(Error, Debug)]
pub enum EhrApiError {
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Session materials contain characters not allowed in headers")]
    InvalidHeader,
}
