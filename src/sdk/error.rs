use thiserror::Error;

#[derive(Error, Debug)]
pub enum JourneyError {
    #[error("Unable to parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    // The backend reply does not have the shape the parser relies on
    #[error("Malformed journey response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported coordinate shape: {0}")]
    UnsupportedCoordinateShape(String),

    #[error("Date is out of the supported calendar range: {0}")]
    DateOutOfRange(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JourneyError {
    pub fn parse(input: &str, reason: impl ToString) -> Self {
        JourneyError::Parse {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type JourneyResult<T> = Result<T, JourneyError>;
