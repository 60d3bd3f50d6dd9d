//! Crate error types

use thiserror::Error;

/// Result type for rankpulse operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Referenced tracked keyword row does not exist
    #[error("tracked keyword not found")]
    TrackedKeywordNotFound { id: i64 },

    /// Credentials for an external service are not configured
    #[error("{service} credentials are not configured")]
    MissingCredentials { service: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// External API answered with a non-success status
    #[error("{service} API error: {status}{}", format_body(.body))]
    Provider {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("signature error: {0}")]
    Signature(String),
}

impl Error {
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    #[inline]
    pub fn provider(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            service,
            status,
            body: body.into(),
        }
    }

    /// True for failures of the local store rather than of a measurement.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_is_stable() {
        let err = Error::TrackedKeywordNotFound { id: 7 };
        assert_eq!(err.to_string(), "tracked keyword not found");
    }

    #[test]
    fn provider_error_appends_body_only_when_present() {
        let bare = Error::provider("Naver blog search", 500, "");
        assert_eq!(bare.to_string(), "Naver blog search API error: 500");

        let with_body = Error::provider("SearchAd keywordstool", 403, "{\"code\":1}");
        assert_eq!(
            with_body.to_string(),
            "SearchAd keywordstool API error: 403 - {\"code\":1}"
        );
    }

    #[test]
    fn only_database_errors_count_as_persistence() {
        let db = Error::Database(rusqlite::Error::QueryReturnedNoRows);
        assert!(db.is_persistence());
        assert!(!Error::invalid_input("x").is_persistence());
    }
}
