//! Errors raised while fetching or decoding provider content.

use thiserror::Error;

/// Failure while talking to the content provider or decoding its payloads.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Network failure, timeout or an unreadable response body.
    #[error("content provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("content provider returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL without its query string.
        url: String,
    },

    /// The payload or pagination locator does not have the expected shape.
    #[error("malformed content payload: {0}")]
    Malformed(String),

    /// No document matches the requested identifier.
    #[error("no document found for uid `{uid}`")]
    NotFound {
        /// The identifier that failed to resolve.
        uid: String,
    },
}

impl ContentError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        !self.is_not_found()
    }

    /// Whether the provider has no document for the requested identifier.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ContentError>;

#[cfg(test)]
mod tests {
    use super::ContentError;

    #[test]
    fn not_found_is_the_only_non_transient_error() {
        let missing = ContentError::NotFound {
            uid: "gone".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());

        let status = ContentError::Status {
            status: 503,
            url: "https://repo.cdn.prismic.io/api/v2".to_string(),
        };
        assert!(status.is_transient());
        assert!(ContentError::Malformed("no results".to_string()).is_transient());
    }

    #[test]
    fn json_errors_become_malformed() {
        let err = serde_json::from_str::<Vec<u32>>("{").expect_err("invalid json");
        assert!(matches!(ContentError::from(err), ContentError::Malformed(_)));
    }
}
