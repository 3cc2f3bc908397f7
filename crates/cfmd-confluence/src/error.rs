//! Error types for Confluence integration.

use cfmd_export::SourceError;

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 200;

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, malformed body).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
        /// Numeric `Retry-After` header, in seconds.
        retry_after: Option<u64>,
    },
}

impl ConfluenceError {
    pub(crate) fn response(status: u16, body: &str, retry_after: Option<u64>) -> Self {
        let body = match body.char_indices().nth(MAX_ERROR_BODY) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_owned(),
        };
        Self::HttpResponse {
            status,
            body,
            retry_after,
        }
    }

    /// HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            Self::HttpRequest(_) => None,
        }
    }

    /// Classify for the exporter.
    ///
    /// 401 and 403 are fatal authentication failures, 404 means the page
    /// does not exist, everything else is a transport error.
    #[must_use]
    pub fn into_source_error(self, page_id: &str) -> SourceError {
        match self.status() {
            Some(status @ (401 | 403)) => {
                SourceError::AuthFailure(format!("HTTP {status} while requesting page {page_id}"))
            }
            Some(404) => SourceError::PageNotFound(page_id.to_owned()),
            _ => SourceError::Transport(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_auth_statuses_are_fatal() {
        for status in [401, 403] {
            let err = ConfluenceError::response(status, "denied", None);
            assert!(matches!(
                err.into_source_error("7"),
                SourceError::AuthFailure(_)
            ));
        }
    }

    #[test]
    fn test_not_found_carries_page_id() {
        let err = ConfluenceError::response(404, "{}", None);
        assert_eq!(
            err.into_source_error("42"),
            SourceError::PageNotFound("42".to_owned())
        );
    }

    #[test]
    fn test_other_statuses_are_transport() {
        let err = ConfluenceError::response(500, "boom", None);
        assert_eq!(
            err.into_source_error("1"),
            SourceError::Transport("HTTP error: 500 - boom".to_owned())
        );
    }

    #[test]
    fn test_request_errors_are_transport() {
        let err = ConfluenceError::from(ureq::Error::ConnectionFailed);
        assert!(err.status().is_none());
        assert!(matches!(
            err.into_source_error("1"),
            SourceError::Transport(_)
        ));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let ConfluenceError::HttpResponse { body, .. } =
            ConfluenceError::response(502, &body, None)
        else {
            panic!("expected response error");
        };
        assert_eq!(body.len(), MAX_ERROR_BODY + 3);
        assert!(body.ends_with("..."));
    }
}
