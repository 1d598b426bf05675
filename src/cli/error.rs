//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{BuildError, HostError};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    /// Some files failed `check`; each was already reported.
    #[error("{failed} of {total} declarations failed")]
    CheckFailed { failed: usize, total: usize },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::CheckFailed { .. } => crate::exitcode::DATAERR,
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Build(BuildError::Host { .. })
        | ApplicationError::Host(HostError::StaleNode(_)) => crate::exitcode::SOFTWARE,
        ApplicationError::Build(_) | ApplicationError::Host(_) => crate::exitcode::DATAERR,
        ApplicationError::NotFound { .. } => crate::exitcode::NOINPUT,
        ApplicationError::Declaration { .. } => crate::exitcode::DATAERR,
        ApplicationError::Catalog { .. }
        | ApplicationError::InvalidCatalog(_)
        | ApplicationError::Config { .. } => {
            crate::exitcode::CONFIG
        }
        ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_unsupported_attribute_when_mapping_exit_code_then_dataerr() {
        let err: CliError = ApplicationError::Build(BuildError::UnsupportedAttribute {
            kind: "button".to_string(),
            attribute: "foo".to_string(),
            path: "/button".to_string(),
        })
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_declaration_when_mapping_exit_code_then_noinput() {
        let err: CliError = ApplicationError::NotFound {
            path: PathBuf::from("view.toml"),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_unknown_kind_from_host_when_mapping_exit_code_then_dataerr() {
        let err: CliError = ApplicationError::Host(HostError::UnknownKind("x".to_string())).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }
}
