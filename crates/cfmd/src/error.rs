//! CLI error types.

use cfmd_config::ConfigError;
use cfmd_export::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Validation(String),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 2: invalid usage, configuration or missing root page.
    /// 3: authentication failure.
    /// 4: any other fatal error.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Validation(_)
            | Self::Export(ExportError::RootNotFound(_) | ExportError::OutputDir { .. }) => 2,
            Self::Export(ExportError::Auth(_)) => 3,
            Self::Export(ExportError::RootUnavailable { .. }) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_usage_errors_exit_2() {
        assert_eq!(
            CliError::Validation("bad page id".to_owned()).exit_code(),
            2
        );
        assert_eq!(
            CliError::Config(ConfigError::Validation("no token".to_owned())).exit_code(),
            2
        );
        assert_eq!(
            CliError::Export(ExportError::RootNotFound("1".to_owned())).exit_code(),
            2
        );
        assert_eq!(
            CliError::Export(ExportError::OutputDir {
                path: PathBuf::from("out"),
                source: std::io::Error::other("read-only"),
            })
            .exit_code(),
            2
        );
    }

    #[test]
    fn test_auth_exits_3() {
        assert_eq!(
            CliError::Export(ExportError::Auth("HTTP 401".to_owned())).exit_code(),
            3
        );
    }

    #[test]
    fn test_unreachable_root_exits_4() {
        let err = CliError::Export(ExportError::RootUnavailable {
            page_id: "1".to_owned(),
            message: "connection refused".to_owned(),
        });
        assert_eq!(err.exit_code(), 4);
    }
}
