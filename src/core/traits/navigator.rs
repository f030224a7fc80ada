/// Port for moving the user to another view.
pub trait Navigator: Send + Sync {
    /// Navigate unconditionally to `path`.
    fn redirect_to(&self, path: &str);
}
