/// ProgressReporter port for reporting progress during operations
///
/// This port abstracts progress reporting (e.g., to stderr)
/// to provide user feedback while jobs stream results in. The
/// `Send + Sync` bound lets upload progress callbacks forward here
/// from the transfer task.
pub trait ProgressReporter: Send + Sync {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress with a current/total count
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}

/// Shared handles report through the same reporter, so upload callbacks
/// and the workflow can hold the one instance.
impl<P: ProgressReporter + ?Sized> ProgressReporter for std::sync::Arc<P> {
    fn report(&self, message: &str) {
        (**self).report(message);
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        (**self).report_progress(current, total, message);
    }

    fn report_error(&self, message: &str) {
        (**self).report_error(message);
    }

    fn report_completion(&self, message: &str) {
        (**self).report_completion(message);
    }
}
