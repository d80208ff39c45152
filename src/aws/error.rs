//! AWS error classification
//!
//! Classifies AWS SDK operation errors into the categories the check
//! policies distinguish, using the error code and message from
//! `ProvideErrorMetadata` rather than string matching on Debug output.
//!
//! The one place message matching is unavoidable is detecting "Control
//! Tower is not enrolled/subscribed in this region", which the service
//! reports as a ValidationException with a human-readable message. The
//! matched substrings live in `NOT_ENROLLED_MARKERS` so the rule is visible
//! and testable.

use thiserror::Error;

/// AWS API error categories relevant to the preflight checks
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Caller lacks permission for the operation
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// The queried resource does not exist
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// The service is not subscribed/available/enrolled in this region
    #[error("Service not enrolled in this region: {message}")]
    NotEnrolled { message: String },

    /// Any other AWS SDK error, with code and message
    #[error("AWS error{}: {message}", code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Other {
        code: Option<String>,
        message: String,
    },
}

impl ApiError {
    /// True if the check should be skipped rather than failed: the caller
    /// cannot verify the condition, which the preflight policy treats as
    /// acceptable.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ApiError::AccessDenied { .. } | ApiError::NotFound { .. } | ApiError::NotEnrolled { .. }
        )
    }
}

/// Error codes indicating the caller lacks permission
const ACCESS_DENIED_CODES: &[&str] = &["AccessDeniedException", "AccessDenied"];

/// Error codes indicating the resource does not exist
const NOT_FOUND_CODES: &[&str] = &["ResourceNotFoundException"];

/// Message substrings of a ValidationException that mean Control Tower is
/// not set up in the target region
pub const NOT_ENROLLED_MARKERS: &[&str] = &["not subscribed", "not available in the", "not enrolled"];

/// Classify an AWS SDK error from its code and message.
pub fn classify_api_error(code: Option<&str>, message: Option<&str>) -> ApiError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => ApiError::AccessDenied { message },
        Some(c) if NOT_FOUND_CODES.contains(&c) => ApiError::NotFound { message },
        Some("ValidationException") if is_not_enrolled_message(&message) => {
            ApiError::NotEnrolled { message }
        }
        _ => ApiError::Other {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// True if a ValidationException message indicates the service is not
/// subscribed/available/enrolled in the region.
pub fn is_not_enrolled_message(message: &str) -> bool {
    NOT_ENROLLED_MARKERS.iter().any(|m| message.contains(m))
}

/// Classify any AWS SDK error that carries error metadata.
///
/// `SdkError<E>` implements `ProvideErrorMetadata` whenever the operation
/// error does, so this covers every operation the checks issue.
pub fn classify_sdk_error<E>(err: &E) -> ApiError
where
    E: aws_sdk_cloudformation::error::ProvideErrorMetadata,
{
    classify_api_error(err.code(), err.message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_codes() {
        for code in ACCESS_DENIED_CODES {
            let err = classify_api_error(Some(code), Some("denied"));
            assert!(
                matches!(err, ApiError::AccessDenied { .. }),
                "Expected AccessDenied for code: {code}"
            );
            assert!(err.is_skippable());
        }
    }

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_api_error(Some(code), Some("gone"));
            assert!(
                matches!(err, ApiError::NotFound { .. }),
                "Expected NotFound for code: {code}"
            );
            assert!(err.is_skippable());
        }
    }

    #[test]
    fn every_enrollment_marker_is_recognized() {
        for marker in NOT_ENROLLED_MARKERS {
            let message = format!("AWS Control Tower is {marker} for this account.");
            let err = classify_api_error(Some("ValidationException"), Some(&message));
            assert!(
                matches!(err, ApiError::NotEnrolled { .. }),
                "Expected NotEnrolled for marker: {marker}"
            );
        }
    }

    #[test]
    fn realistic_not_enrolled_message() {
        let message = "AWS Control Tower is not available in the us-east-1 Region for the \
                       account 123456789012. Make sure your account is enrolled in AWS Control Tower.";
        let err = classify_api_error(Some("ValidationException"), Some(message));
        assert!(matches!(err, ApiError::NotEnrolled { .. }));
    }

    #[test]
    fn validation_exception_without_marker_is_other() {
        let err = classify_api_error(Some("ValidationException"), Some("bad parameter"));
        assert!(matches!(err, ApiError::Other { .. }));
        assert!(!err.is_skippable());
    }

    #[test]
    fn marker_in_non_validation_error_is_other() {
        // The marker list only applies to ValidationException
        let err = classify_api_error(Some("ThrottlingException"), Some("not enrolled"));
        assert!(matches!(err, ApiError::Other { .. }));
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_api_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, ApiError::Other { code: Some(_), .. }));

        let err2 = classify_api_error(None, None);
        assert!(matches!(err2, ApiError::Other { code: None, .. }));
    }

    #[test]
    fn display_includes_code() {
        let err = ApiError::Other {
            code: Some("ThrottlingException".to_string()),
            message: "slow down".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("ThrottlingException"));
        assert!(text.contains("slow down"));
    }
}
