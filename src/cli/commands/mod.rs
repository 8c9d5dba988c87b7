//! CLI command implementations
//!
//! Exit codes shared by all commands:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Partial success or remote resource not found |
//! | 2 | Configuration or input error |
//! | 3 | Authentication failure |
//! | 4 | Connection or transport failure |
//! | 5 | Fatal error |

pub mod fetch_patient;
pub mod providers;
pub mod sync;
pub mod test_connection;
pub mod validate;
pub mod webhook;

use crate::config::{load_config, FhirsyncConfig};
use crate::domain::EmrError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_AUTH: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Loads configuration, printing the failure and returning the exit code on error
pub(crate) fn load_or_report(config_path: &str) -> Result<FhirsyncConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        println!("❌ Failed to load configuration file: {config_path}");
        println!("   Error: {e}");
        EXIT_CONFIG
    })
}

/// Exit code for an EMR call failure
pub(crate) fn emr_exit_code(error: &EmrError) -> i32 {
    match error {
        EmrError::ProviderNotFound(_)
        | EmrError::ProviderDisabled(_)
        | EmrError::InvalidId(_) => EXIT_CONFIG,
        EmrError::AuthFailure(_) => EXIT_AUTH,
        EmrError::NotFound(_) => EXIT_PARTIAL,
        EmrError::Transport { .. } | EmrError::InvalidResponse(_) => EXIT_CONNECTION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emr_exit_codes() {
        assert_eq!(emr_exit_code(&EmrError::ProviderNotFound("x".into())), EXIT_CONFIG);
        assert_eq!(emr_exit_code(&EmrError::ProviderDisabled("x".into())), EXIT_CONFIG);
        assert_eq!(emr_exit_code(&EmrError::InvalidId("a/b".into())), EXIT_CONFIG);
        assert_eq!(emr_exit_code(&EmrError::AuthFailure("x".into())), EXIT_AUTH);
        assert_eq!(emr_exit_code(&EmrError::NotFound("x".into())), EXIT_PARTIAL);
        assert_eq!(emr_exit_code(&EmrError::status(500, "x")), EXIT_CONNECTION);
    }

    #[test]
    fn test_load_or_report_missing_file() {
        assert_eq!(load_or_report("does-not-exist.toml").unwrap_err(), EXIT_CONFIG);
    }
}
