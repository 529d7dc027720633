use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaTransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("da server at {url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("da server request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),
}

impl DaTransportError {
    pub(crate) fn from_send(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
            }
        } else {
            Self::Request(err)
        }
    }
}
