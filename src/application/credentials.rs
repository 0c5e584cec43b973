// Bearer credential source for outgoing API requests

/// Supplies the bearer token attached to each request. Resolved on every
/// call; `None` means the request goes out without an Authorization header.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}
