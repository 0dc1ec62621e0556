use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session store error ({status}): {body}")]
    Api { status: u16, body: String },
}
