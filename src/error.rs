type RequestTokenError =
    oauth2::basic::BasicRequestTokenError<oauth2::reqwest::Error<reqwest::Error>>;

/// Everything that can go wrong, at startup or while answering a callback.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("{0} must be set")]
    MissingCredential(&'static str),
    #[error("invalid url given")]
    InvalidUrl,
    #[error("an IO error occured: {0}")]
    IO(#[from] std::io::Error),
    #[error("code not found")]
    MissingCode,
    #[error("state not found")]
    MissingState,
    #[error("state mismatch")]
    StateMismatch,
    #[error("failed to get token: {0}")]
    RequestToken(#[from] RequestTokenError),
    #[error("failed to get character: {0}")]
    Verify(#[source] reqwest::Error),
    #[error("failed to get character: {0}")]
    VerifyStatus(reqwest::StatusCode),
}

impl Error {
    /// HTTP status the callback route answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingCode | Error::MissingState | Error::StateMismatch => 400,
            _ => 500,
        }
    }
}

#[allow(missing_docs)]
pub type Result<T, E = Error> = std::result::Result<T, E>;
