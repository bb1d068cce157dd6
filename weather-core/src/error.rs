use thiserror::Error;

/// Failure of a weather lookup. Each variant carries a human-readable detail.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider reported that the requested location does not exist.
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// The location resolved, but the forecast lookup failed.
    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(String),

    /// Network-level failure (timeout, DNS, connection reset) on either lookup.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The first lookup answered with something other than conditions or "not found".
    #[error("Unexpected response from weather provider: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LocationNotFound,
    ForecastUnavailable,
    Transport,
    UnexpectedResponse,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::LocationNotFound(_) => ErrorKind::LocationNotFound,
            WeatherError::ForecastUnavailable(_) => ErrorKind::ForecastUnavailable,
            WeatherError::Transport(_) => ErrorKind::Transport,
            WeatherError::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            WeatherError::LocationNotFound(d)
            | WeatherError::ForecastUnavailable(d)
            | WeatherError::Transport(d)
            | WeatherError::UnexpectedResponse(d) => d,
        }
    }

    /// Whether retrying the same request later may succeed. Retry policy is the caller's.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ForecastUnavailable | ErrorKind::Transport
        )
    }
}
