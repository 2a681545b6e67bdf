//! Token resolution: scan token → registration.

use std::sync::Arc;

use crate::domain::{CheckInRejection, ResolvedRegistration};
use crate::error::GatewayError;
use crate::persistence::AttendanceStore;

/// Trims a raw scan token and rejects empty input.
///
/// Tokens are opaque, so nothing beyond surrounding whitespace is touched.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the token is empty after
/// trimming.
pub fn normalize_token(raw: &str) -> Result<&str, GatewayError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "token must not be empty".to_string(),
        ));
    }
    Ok(token)
}

/// Maps scan tokens to exactly one registration.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    store: Arc<dyn AttendanceStore>,
}

impl TokenResolver {
    /// Creates a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Resolves `token` (already normalized) with exact, case-sensitive
    /// comparison.
    ///
    /// # Errors
    ///
    /// Returns [`CheckInRejection::NotFound`] (wrapped in
    /// [`GatewayError::CheckInRejected`]) when no registration carries the
    /// token, or a persistence error.
    pub async fn resolve(&self, token: &str) -> Result<ResolvedRegistration, GatewayError> {
        self.store
            .find_registration_by_token(token)
            .await?
            .ok_or(GatewayError::CheckInRejected(CheckInRejection::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_token("  abc\n").ok(), Some("abc"));
    }

    #[test]
    fn normalize_rejects_blank() {
        assert!(matches!(
            normalize_token(" \t "),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn normalize_preserves_case() {
        assert_eq!(normalize_token("AbC").ok(), Some("AbC"));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let resolver = TokenResolver::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            resolver.resolve("xyz").await,
            Err(GatewayError::CheckInRejected(CheckInRejection::NotFound))
        ));
    }
}
