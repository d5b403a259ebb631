//! Scoped authenticator for the NTLM scheme

use super::{FallbackAuthenticator, NoCredentials, ScopedAuthenticator};
use crate::scheme::{NtCredential, Ntlm, SchemeCredential, SchemeFamily};
use crate::storage::{CredentialEntry, CredentialStore, Target};
use crate::{AuthError, Password};
use std::sync::Arc;

/// Presents per-target NTLM credentials
///
/// Each entry's identity holds at least three fields: `0 = user name`,
/// `1 = workstation`, `2 = domain`.
pub struct ScopedNtAuthenticator {
    store: CredentialStore<Ntlm>,
    fallback: Arc<dyn FallbackAuthenticator>,
}

impl ScopedNtAuthenticator {
    /// Create an authenticator with credentials for one target
    ///
    /// `workstation` is the ID of the local workstation. `domain` is the
    /// domain being authenticated in, which need not be the workstation's.
    pub fn new(
        target: &str,
        username: impl Into<String>,
        password: impl Into<Password>,
        workstation: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let target = Target::parse(target)?;
        let entry = Self::entry(username, password, workstation, domain);
        let store = CredentialStore::with_entry(target, entry)?;
        Ok(Self::with_store(store))
    }

    /// Create an authenticator from a map of targets to optional entries
    ///
    /// `None` values are skipped. Any entry with fewer than three identity
    /// fields fails the whole batch.
    pub fn from_entries<I>(entries: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (Target, Option<CredentialEntry>)>,
    {
        Ok(Self::with_store(CredentialStore::from_entries(entries)?))
    }

    /// Wrap an existing store, falling back to no credentials
    pub fn with_store(store: CredentialStore<Ntlm>) -> Self {
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
        workstation: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<(), AuthError> {
        let target = Target::parse(target)?;
        self.store
            .insert(target, Self::entry(username, password, workstation, domain))?;
        Ok(())
    }

    pub fn store(&self) -> &CredentialStore<Ntlm> {
        &self.store
    }

    fn entry(
        username: impl Into<String>,
        password: impl Into<Password>,
        workstation: impl Into<String>,
        domain: impl Into<String>,
    ) -> CredentialEntry {
        CredentialEntry::new(
            [username.into(), workstation.into(), domain.into()],
            password,
        )
    }
}

impl ScopedAuthenticator for ScopedNtAuthenticator {
    type Entry = CredentialEntry;

    fn scheme(&self) -> &'static str {
        Ntlm::NAME
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

    fn create_credentials(&self, entry: &CredentialEntry) -> Option<SchemeCredential> {
        let identity = entry.identity();
        Some(
            NtCredential::new(
                identity.get(0)?,
                entry.secret().to_secret(),
                identity.get(1),
                identity.get(2),
            )
            .into(),
        )
    }
}
