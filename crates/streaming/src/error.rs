/// Failure of a single remote imagery request.
///
/// None of these are fatal: the caller releases its in-flight guard and waits
/// for the next qualifying movement or explicit action to try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The service answered with a non-2xx status.
    Status(u16),
    /// No complete response within the client timeout.
    Timeout,
    /// Connection, TLS or body read failure.
    Network(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status(code) => write!(f, "imagery service returned HTTP {code}"),
            FetchError::Timeout => write!(f, "imagery request timed out"),
            FetchError::Network(msg) => write!(f, "imagery request failed: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
