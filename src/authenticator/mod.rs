//! Scoped authenticators
//!
//! Handles:
//! - Looking up the credentials scoped to a target URI
//! - Building the scheme credential an authentication engine consumes
//! - Delegating to a fallback authenticator when nothing is scoped

mod basic;
mod fallback;
mod ntlm;
mod provider;

pub use basic::ScopedBasicAuthenticator;
pub use fallback::{DefaultCredentials, FallbackAuthenticator, NoCredentials, PatternFallback};
pub use ntlm::ScopedNtAuthenticator;
pub use provider::{AuthScope, CredentialsProvider};

use crate::scheme::{SchemeCredential, UsernamePasswordCredential};
use crate::storage::Target;
use crate::Password;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// An authenticator presenting different credentials to different targets
///
/// Implementors supply the lookup primitive and the field extractors; the
/// default methods turn a hit into a username/password credential and send
/// misses to the fallback.
pub trait ScopedAuthenticator: Send + Sync {
    /// What the authenticator stores per target
    type Entry: Send + Sync;

    /// Scheme family name, used in logs
    fn scheme(&self) -> &'static str;

    /// Look up the entry scoped to a target
    fn get_credentials(&self, target: &Target) -> Option<Arc<Self::Entry>>;

    /// Extract the user name from an entry, if there is one
    fn username_from<'a>(&self, entry: Option<&'a Self::Entry>) -> Option<&'a str>;

    /// Extract the password from an entry, if there is one
    fn secret_from<'a>(&self, entry: Option<&'a Self::Entry>) -> Option<&'a Password>;

    /// Authenticator consulted for targets without scoped credentials
    fn fallback(&self) -> &dyn FallbackAuthenticator;

    /// Build the scheme credential for a stored entry
    fn create_credentials(&self, entry: &Self::Entry) -> Option<SchemeCredential> {
        let username = self.username_from(Some(entry))?;
        let password = self.secret_from(Some(entry))?;
        Some(UsernamePasswordCredential::new(username, password.to_secret()).into())
    }

    /// Resolve the credential to present when `target` challenges
    fn resolve_credentials(&self, target: &Target) -> Option<SchemeCredential> {
        match self.get_credentials(target) {
            Some(entry) => {
                trace!(uri = %target, scheme = self.scheme(), "Using scoped credentials");
                self.create_credentials(&entry)
            }
            None => {
                debug!(uri = %target, scheme = self.scheme(), "No scoped credentials, using fallback");
                self.fallback().resolve(target)
            }
        }
    }

    /// Register the credential for `target` with a credentials provider
    ///
    /// Returns false, leaving the provider untouched, when no credential
    /// resolves for the target or the target has no host to scope it to.
    fn apply(&self, provider: &CredentialsProvider, target: &Target) -> bool {
        let Some(scope) = AuthScope::for_target(target) else {
            warn!(uri = %target, "Target has no host, not registering credentials");
            return false;
        };
        match self.resolve_credentials(target) {
            Some(credential) => {
                provider.set_credentials(scope, credential);
                true
            }
            None => false,
        }
    }
}
