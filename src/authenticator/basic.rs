//! Scoped authenticator for the Basic and Digest schemes

use super::{FallbackAuthenticator, NoCredentials, ScopedAuthenticator};
use crate::scheme::{Basic, SchemeFamily};
use crate::storage::{CredentialEntry, CredentialStore, Target};
use crate::{AuthError, Password};
use std::sync::Arc;

/// Presents per-target user names and passwords to Basic and Digest
/// challenges
pub struct ScopedBasicAuthenticator {
    store: CredentialStore<Basic>,
    fallback: Arc<dyn FallbackAuthenticator>,
}

impl ScopedBasicAuthenticator {
    /// Create an authenticator with credentials for one target
    pub fn new(
        target: &str,
        username: impl Into<String>,
        password: impl Into<Password>,
    ) -> Result<Self, AuthError> {
        let target = Target::parse(target)?;
        let store = CredentialStore::with_entry(target, Self::entry(username, password))?;
        Ok(Self::with_store(store))
    }

    /// Create an authenticator from a map of targets to optional entries
    ///
    /// Entries need at least one identity field, the user name. `None`
    /// values are skipped.
    pub fn from_entries<I>(entries: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (Target, Option<CredentialEntry>)>,
    {
        Ok(Self::with_store(CredentialStore::from_entries(entries)?))
    }

    /// Wrap an existing store, falling back to no credentials
    pub fn with_store(store: CredentialStore<Basic>) -> Self {
        Self {
            store,
            fallback: Arc::new(NoCredentials),
        }
    }

    /// Replace the fallback authenticator
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackAuthenticator>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Add or overwrite the credentials for a target
    pub fn add_credentials(
        &self,
        target: &str,
        username: impl Into<String>,
        password: impl Into<Password>,
    ) -> Result<(), AuthError> {
        let target = Target::parse(target)?;
        self.store
            .insert(target, Self::entry(username, password))?;
        Ok(())
    }

    pub fn store(&self) -> &CredentialStore<Basic> {
        &self.store
    }

    fn entry(username: impl Into<String>, password: impl Into<Password>) -> CredentialEntry {
        CredentialEntry::new([username.into()], password)
    }
}

impl ScopedAuthenticator for ScopedBasicAuthenticator {
    type Entry = CredentialEntry;

    fn scheme(&self) -> &'static str {
        Basic::NAME
    }

    fn get_credentials(&self, target: &Target) -> Option<Arc<CredentialEntry>> {
        self.store.get(target)
    }

    fn username_from<'a>(&self, entry: Option<&'a CredentialEntry>) -> Option<&'a str> {
        entry.and_then(CredentialEntry::username)
    }

    fn secret_from<'a>(&self, entry: Option<&'a CredentialEntry>) -> Option<&'a Password> {
        entry.map(CredentialEntry::secret)
    }

    fn fallback(&self) -> &dyn FallbackAuthenticator {
        self.fallback.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::DefaultCredentials;
    use crate::scheme::UsernamePasswordCredential;
    use crate::StoreError;

    fn target(uri: &str) -> Target {
        Target::parse(uri).unwrap()
    }

    #[test]
    fn test_resolves_username_password() {
        let auth = ScopedBasicAuthenticator::new("https://example.org/", "bob", "pw").unwrap();

        let cred = auth
            .resolve_credentials(&target("https://example.org/"))
            .unwrap();
        let cred = cred.as_username_password().unwrap();
        assert_eq!(cred.username(), "bob");
        assert_eq!(cred.password().expose(), "pw");
    }

    #[test]
    fn test_blank_target_rejected() {
        let result = ScopedBasicAuthenticator::new("", "bob", "pw");
        assert!(matches!(
            result,
            Err(AuthError::InvalidArgument(StoreError::MissingTarget))
        ));

        let auth = ScopedBasicAuthenticator::new("https://example.org/", "bob", "pw").unwrap();
        assert!(auth.add_credentials("  ", "eve", "pw").is_err());
        assert_eq!(auth.store().len(), 1);
    }

    #[test]
    fn test_miss_uses_fallback() {
        let auth = ScopedBasicAuthenticator::new("https://example.org/", "bob", "pw")
            .unwrap()
            .with_fallback(Arc::new(DefaultCredentials::new(
                UsernamePasswordCredential::new("anonymous", "guest"),
            )));

        let cred = auth
            .resolve_credentials(&target("https://other.org/"))
            .unwrap();
        assert_eq!(cred.username(), "anonymous");

        let no_fallback = ScopedBasicAuthenticator::new("https://example.org/", "bob", "pw").unwrap();
        assert!(no_fallback
            .resolve_credentials(&target("https://other.org/"))
            .is_none());
    }

    #[test]
    fn test_extractors_tolerate_absent_entry() {
        let auth = ScopedBasicAuthenticator::new("https://example.org/", "bob", "pw").unwrap();
        assert_eq!(auth.username_from(None), None);
        assert!(auth.secret_from(None).is_none());

        let entry = auth.get_credentials(&target("https://example.org/"));
        assert_eq!(auth.username_from(entry.as_deref()), Some("bob"));
        assert_eq!(
            auth.secret_from(entry.as_deref()).map(Password::expose),
            Some("pw")
        );
    }
}
