/// Supplies a pre-resolved bearer token for each request.
///
/// The client has no opinion on how the credential is obtained or refreshed;
/// `None` means "no credential right now" and fails the call with
/// [`ApiError::MissingAuth`](crate::ApiError::MissingAuth).
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed token, for tests and CLIs with a long-lived credential.
pub struct StaticToken(String);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}
