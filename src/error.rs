use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The request never completed (connectivity, timeout, TLS).
    #[error("{0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please select a PDF file")]
    NoFileSelected,
    #[error("An upload is already in progress")]
    Busy,
    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Cannot save file: {0}")]
    Save(String),
    #[error("No answer from terminal: {0}")]
    Prompt(String),
    /// A newer request of the same kind was issued before this one finished.
    #[error("Response superseded by a newer request")]
    Superseded,
}

impl ClientError {
    /// Message shown in the upload panel's status banner.
    pub fn upload_message(&self) -> String {
        match self {
            ClientError::Api(ApiError::Server { message, .. }) => format!("Server error: {}", message),
            ClientError::Api(err) => format!("Request failed: {}", err),
            other => other.to_string(),
        }
    }
}
