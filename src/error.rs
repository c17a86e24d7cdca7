//! Error types for the search core.
//!
//! Validation failures are raised before any model call. Everything the
//! model capability reports (transport, timeout, malformed output, quota)
//! lands in [`WisdomError::Service`] and travels untouched to the HTTP layer.
//! "No verse found" is not an error at all: it is a `SearchResult` whose
//! verse is `None`.

use thiserror::Error;

use crate::search::normalize::MIN_QUERY_CHARS;

#[derive(Error, Debug)]
pub enum WisdomError {
    #[error("query too short (at least {} characters)", MIN_QUERY_CHARS)]
    QueryTooShort,

    #[error("invalid mode: {0}")]
    InvalidMode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model service failed: {0}")]
    Service(#[from] anyhow::Error),
}

impl WisdomError {
    /// True for errors the user can fix by changing their input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, WisdomError::Service(_))
    }

    /// True when the model call gave up because the request timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            WisdomError::Service(e) => e.chain().any(|cause| {
                cause
                    .downcast_ref::<reqwest::Error>()
                    .is_some_and(|re| re.is_timeout())
                    || cause.downcast_ref::<tokio::time::error::Elapsed>().is_some()
            }),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WisdomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_user_correctable() {
        assert!(WisdomError::QueryTooShort.is_validation());
        assert!(WisdomError::InvalidMode("Mystic".into()).is_validation());
        assert!(WisdomError::InvalidInput("empty verse".into()).is_validation());
    }

    #[test]
    fn test_service_error_is_not_validation() {
        let err = WisdomError::Service(anyhow::anyhow!("quota exceeded"));
        assert!(!err.is_validation());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_query_too_short_message() {
        assert!(WisdomError::QueryTooShort
            .to_string()
            .starts_with("query too short"));
    }

    #[tokio::test]
    async fn test_elapsed_counts_as_timeout() {
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        let err = WisdomError::Service(anyhow::Error::new(elapsed).context("verse lookup"));
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_reqwest_timeout_counts_as_timeout() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(100))
            .build()
            .unwrap();
        let sent = client.get(format!("http://{addr}/")).send().await.unwrap_err();
        let err = WisdomError::Service(anyhow::Error::new(sent).context("verse lookup"));
        assert!(err.is_timeout());
        assert!(!err.is_validation());
    }
}
