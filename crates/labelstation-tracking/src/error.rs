use thiserror::Error;

/// Errors talking to the scan tracking service.
///
/// None of these mean "not scanned": a barcode the service does not know is
/// a successful answer, not an error.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("tracking service unreachable ({endpoint}): {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("tracking service returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected record shape.
    #[error("malformed response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Unusable client configuration
    #[error("tracking configuration error: {0}")]
    Config(String),

    /// The local issuance store could not be read
    #[error("issuance store unavailable: {0}")]
    Store(String),
}

impl TrackingError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Whether a later poll may succeed without operator action.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Store(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Deserialization { .. } | Self::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(503, true)]
    #[case(500, true)]
    #[case(400, false)]
    #[case(401, false)]
    fn test_status_transience(#[case] status: u16, #[case] transient: bool) {
        let err = TrackingError::Status {
            endpoint: "GET /devices".into(),
            status,
            body: String::new(),
        };
        assert_eq!(err.is_transient(), transient);
    }

    #[test]
    fn test_config_error_is_permanent() {
        let err = TrackingError::config("bad url");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "tracking configuration error: bad url");
    }
}
