use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum VoteError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("A vote submission is already in flight")]
    SubmissionInFlight,
    #[error("A captcha token is required for this vote")]
    MissingCaptchaToken,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
