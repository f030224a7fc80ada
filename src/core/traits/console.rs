/// Port for the human-facing log output.
///
/// Emission cannot fail from the caller's point of view.
pub trait ConsoleSink: Send + Sync {
    /// Write one formatted log line.
    fn emit(&self, line: &str);

    /// Report a problem with the logging machinery itself.
    fn warn(&self, message: &str);
}
