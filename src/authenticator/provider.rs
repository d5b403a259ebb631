//! Credentials provider handed to the authentication engine

use crate::scheme::SchemeCredential;
use crate::storage::Target;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Host and port a credential is offered to
///
/// `None` in either position matches any value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthScope {
    host: Option<String>,
    port: Option<u16>,
}

impl AuthScope {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: Some(host.into().to_ascii_lowercase()),
            port,
        }
    }

    /// Scope matching every host and port
    pub fn any() -> Self {
        Self {
            host: None,
            port: None,
        }
    }

    /// Scope of a target: its host and explicit or default port
    ///
    /// `None` for targets without a host (relative references, `urn:` and
    /// `file:` URIs). Such targets have no scope narrower than [`any`].
    ///
    /// [`any`]: AuthScope::any
    pub fn for_target(target: &Target) -> Option<Self> {
        let host = target.host()?;
        Some(Self {
            host: Some(host.to_ascii_lowercase()),
            port: target.port(),
        })
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// How specifically this scope covers `other`, or `None` if it does not
    fn match_score(&self, other: &AuthScope) -> Option<u8> {
        let mut score = 0;
        match (&self.host, &other.host) {
            (None, _) => {}
            (Some(a), Some(b)) if a == b => score += 2,
            _ => return None,
        }
        match (self.port, other.port) {
            (None, _) => {}
            (Some(a), Some(b)) if a == b => score += 1,
            _ => return None,
        }
        Some(score)
    }
}

/// Scope-keyed credentials an authentication engine reads during challenges
#[derive(Debug, Default)]
pub struct CredentialsProvider {
    credentials: RwLock<HashMap<AuthScope, SchemeCredential>>,
}

impl CredentialsProvider {
    pub fn new() -> Self {
        Self {
            credentials: RwLock::new(HashMap::new()),
        }
    }

    /// Set or replace the credential for a scope
    pub fn set_credentials(&self, scope: AuthScope, credential: SchemeCredential) {
        self.credentials.write().insert(scope, credential);
    }

    /// Best credential for a scope
    ///
    /// An exact scope wins; otherwise the most specific registered scope
    /// covering the request (host before port) is used.
    pub fn get_credentials(&self, scope: &AuthScope) -> Option<SchemeCredential> {
        let credentials = self.credentials.read();
        if let Some(credential) = credentials.get(scope) {
            return Some(credential.clone());
        }

        credentials
            .iter()
            .filter_map(|(registered, credential)| {
                registered.match_score(scope).map(|score| (score, credential))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, credential)| credential.clone())
    }

    pub fn clear(&self) {
        self.credentials.write().clear();
    }

    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.read().is_empty()
    }
}
