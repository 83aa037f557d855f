//! Error types for Apify API operations.

use thiserror::Error;

/// Error types the API reports for a missing resource.
const NOT_FOUND_TYPES: [&str; 2] = ["record-not-found", "record-or-token-not-found"];

/// Errors that can occur during Apify API operations.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Configuration is missing or incomplete.
    #[error("Apify configuration required: {0}")]
    ConfigMissing(String),

    /// The API answered with a non-success status.
    #[error("Apify API error ({status_code} {method} {url}): {message}")]
    Api {
        /// HTTP status code of the response.
        status_code: u16,
        /// Vendor error type (e.g. `record-not-found`), if the body carried one.
        error_type: Option<String>,
        /// Vendor error message, or the raw body when no envelope was present.
        message: String,
        /// HTTP method of the failed request.
        method: String,
        /// URL of the failed request.
        url: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The response was successful but not shaped as expected.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The caller passed something the API cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApifyError {
    /// Whether this is the API's "not found" answer.
    ///
    /// Only a 404 whose vendor type names a missing record counts; a 404 for
    /// an unknown route is still a hard error.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApifyError::Api {
                status_code: 404,
                error_type: Some(kind),
                ..
            } => NOT_FOUND_TYPES.contains(&kind.as_str()),
            _ => false,
        }
    }

    /// HTTP status code, for API errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApifyError::Api { status_code, .. } => Some(*status_code),
            ApifyError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for Apify operations.
pub type Result<T> = core::result::Result<T, ApifyError>;

/// Turn a "not found" error into `Ok(None)`, propagating everything else.
pub(crate) fn catch_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status_code: u16, error_type: Option<&str>) -> ApifyError {
        ApifyError::Api {
            status_code,
            error_type: error_type.map(str::to_string),
            message: "boom".to_string(),
            method: "GET".to_string(),
            url: "https://api.apify.com/v2/datasets/abc".to_string(),
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(api_error(404, Some("record-not-found")).is_not_found());
        assert!(api_error(404, Some("record-or-token-not-found")).is_not_found());
        assert!(!api_error(404, Some("page-not-found")).is_not_found());
        assert!(!api_error(404, None).is_not_found());
        assert!(!api_error(400, Some("record-not-found")).is_not_found());
    }

    #[test]
    fn test_catch_not_found() {
        let missing: Result<u32> = Err(api_error(404, Some("record-not-found")));
        assert!(catch_not_found(missing).unwrap().is_none());

        let present: Result<u32> = Ok(7);
        assert_eq!(catch_not_found(present).unwrap(), Some(7));

        let failed: Result<u32> = Err(api_error(500, None));
        assert!(catch_not_found(failed).is_err());
    }

    #[test]
    fn test_display_includes_status_and_message() {
        let msg = api_error(403, Some("insufficient-permissions")).to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("boom"));
    }
}
