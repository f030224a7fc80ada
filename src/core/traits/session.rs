use crate::core::errors::Result;

/// Port exposing the current bearer credential to the request pipeline.
///
/// The pipeline calls [`credential`](SessionProvider::credential) on every
/// request, so implementations must return the latest stored value.
pub trait SessionProvider: Send + Sync {
    /// The active credential, if one is stored.
    fn credential(&self) -> Option<String>;

    /// Persist a freshly issued credential.
    fn store(&self, token: &str) -> Result<()>;

    /// Forget the credential. Idempotent.
    fn clear(&self) -> Result<()>;
}
