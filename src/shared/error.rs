use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - the requested operation completed
    Success = 0,
    /// Application error (API error, subscription error, upload error, etc.)
    ApplicationError = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ApplicationError => write!(f, "Application Error (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
        }
    }
}

/// Application-specific errors for the threat-modelling workflow.
///
/// The taxonomy mirrors where failures can actually occur: loading a
/// diagram, running a mutation, receiving on a subscription channel,
/// or transferring files. Uses thiserror to derive Display and Error
/// traits while keeping the messages user-friendly.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to load diagram '{diagram_id}': {details}\n\n💡 Hint: Check the diagram id with `threatflow list` and verify the API endpoint is reachable")]
    LoadError { diagram_id: String, details: String },

    #[error("Mutation '{operation}' failed: {details}")]
    MutationError {
        operation: &'static str,
        details: String,
    },

    #[error("Subscription '{channel}' failed: {details}\n\n💡 Hint: The generation job may still be running server-side; re-open the diagram to pick up its results")]
    SubscriptionError {
        channel: &'static str,
        details: String,
    },

    #[error("Failed to upload '{path}': {details}\n\n💡 Hint: Check the storage endpoint and that the file is readable")]
    UploadError { path: String, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Configuration error: {message}\n\n💡 Hint: Check threatflow.config.yml or pass the value on the command line")]
    ConfigError { message: String },

    /// Validation error for inputs that never reach the remote service
    #[error("Validation error: {message}")]
    Validation { message: String },
}
