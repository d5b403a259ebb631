//! Fallback authenticators for targets without scoped credentials

use crate::scheme::SchemeCredential;
use crate::storage::Target;
use glob::{Pattern, PatternError};

/// Answers for targets the scoped store has no entry for
pub trait FallbackAuthenticator: Send + Sync {
    /// Credential to present for `target`, or `None` for no credentials
    fn resolve(&self, target: &Target) -> Option<SchemeCredential>;
}

/// Never supplies credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl FallbackAuthenticator for NoCredentials {
    fn resolve(&self, _target: &Target) -> Option<SchemeCredential> {
        None
    }
}

/// Supplies the same credential to every target
#[derive(Debug, Clone)]
pub struct DefaultCredentials {
    credential: SchemeCredential,
}

impl DefaultCredentials {
    pub fn new(credential: impl Into<SchemeCredential>) -> Self {
        Self {
            credential: credential.into(),
        }
    }
}

impl FallbackAuthenticator for DefaultCredentials {
    fn resolve(&self, _target: &Target) -> Option<SchemeCredential> {
        Some(self.credential.clone())
    }
}

/// Glob patterns over the target URI, mapped to credentials
///
/// Patterns are tried in the order they were added; the first match wins.
#[derive(Debug, Default)]
pub struct PatternFallback {
    patterns: Vec<(Pattern, SchemeCredential)>,
}

impl PatternFallback {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Add a pattern that maps to a credential
    pub fn add_pattern(
        &mut self,
        pattern: &str,
        credential: impl Into<SchemeCredential>,
    ) -> Result<(), PatternError> {
        let glob = Pattern::new(pattern)?;
        self.patterns.push((glob, credential.into()));
        Ok(())
    }

    /// Find the credential for a target
    pub fn match_target(&self, target: &Target) -> Option<&SchemeCredential> {
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches(target.as_str()))
            .map(|(_, credential)| credential)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl FallbackAuthenticator for PatternFallback {
    fn resolve(&self, target: &Target) -> Option<SchemeCredential> {
        self.match_target(target).cloned()
    }
}
