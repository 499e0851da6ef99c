/// Shared utilities and error types
pub mod error;
pub mod result;

pub use error::{ExitCode, WorkflowError};
pub use result::Result;
