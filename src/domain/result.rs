//! Result type alias for fhirsync

use super::errors::FhirsyncError;

/// Result type alias for fhirsync operations
///
/// # Examples
///
/// ```
/// use fhirsync::domain::result::Result;
/// use fhirsync::domain::errors::FhirsyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FhirsyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FhirsyncError>;

/// Result of a single EMR operation (provider lookup, token, FHIR call)
pub type EmrResult<T> = std::result::Result<T, super::errors::EmrError>;
