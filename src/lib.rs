//! Realmkey - scoped credentials for HTTP authentication engines
//!
//! Realmkey maps the target URI of an outgoing request to the identity and
//! password that should be presented when that target challenges for
//! authentication, and turns the stored pair into the scheme-specific
//! credential (Basic/Digest or NTLM) an authentication engine consumes.
//! Targets without scoped credentials are handed to a fallback
//! authenticator.

pub mod authenticator;
pub mod config;
pub mod scheme;
pub mod storage;

pub use authenticator::{
    AuthScope, CredentialsProvider, DefaultCredentials, FallbackAuthenticator, NoCredentials,
    PatternFallback, ScopedAuthenticator, ScopedBasicAuthenticator, ScopedNtAuthenticator,
};
pub use scheme::{NtCredential, SchemeCredential, UsernamePasswordCredential};
pub use storage::{CredentialEntry, CredentialStore, IdentityRecord, StoreError, Target};

use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Core error types for Realmkey
#[derive(Error, Debug)]
pub enum AuthError {
    /// Rejected setup data: missing or malformed target, undersized identity
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] storage::StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// An immutable secret string handed to authentication engines
///
/// Zeroed on drop and redacted in `Debug` output.
#[derive(Debug, Clone)]
pub struct Secret(SecretString);

impl Secret {
    /// Create a new secret from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret value
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Get the inner SecretString
    pub fn inner(&self) -> &SecretString {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A mutable password buffer
///
/// The store takes ownership of a password when it is inserted, so there is
/// no caller-side alias left to mutate. The buffer is zeroed on drop and can
/// be wiped explicitly before that.
#[derive(Debug)]
pub struct Password(SecretBox<String>);

impl Password {
    /// Create a password from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::new(value.into())))
    }

    /// Create a password from a character buffer
    pub fn from_chars(chars: &[char]) -> Self {
        Self::new(chars.iter().collect::<String>())
    }

    /// Expose the password value
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Append a character to the buffer
    pub fn push(&mut self, c: char) {
        self.0.expose_secret_mut().push(c);
    }

    /// Zero the buffer and leave it empty
    pub fn wipe(&mut self) {
        self.0.expose_secret_mut().zeroize();
    }

    /// Number of characters in the buffer
    pub fn len(&self) -> usize {
        self.expose().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Copy the password into a transient secret for a scheme credential
    pub fn to_secret(&self) -> Secret {
        Secret::new(self.expose().to_owned())
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Vec<char>> for Password {
    fn from(mut chars: Vec<char>) -> Self {
        let password = Self::from_chars(&chars);
        chars.zeroize();
        password
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("hunter2");
        let rendered = format!("{:?}", password);
        assert!(!rendered.contains("hunter2"));

        let secret = Secret::new("hunter2");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }

    #[test]
    fn test_password_is_mutable_and_wipeable() {
        let mut password = Password::from_chars(&['s', '3', 'c']);
        password.push('r');
        assert_eq!(password.expose(), "s3cr");
        assert_eq!(password.len(), 4);

        password.wipe();
        assert!(password.is_empty());
        assert_eq!(password.expose(), "");
    }

    #[test]
    fn test_password_from_char_buffer() {
        let password = Password::from(vec!['p', 'ä', 's', 's']);
        assert_eq!(password.expose(), "päss");
        assert_eq!(password.len(), 4);
    }

    #[test]
    fn test_transient_secret_is_independent() {
        let mut password = Password::new("s3cret");
        let secret = password.to_secret();
        password.wipe();

        assert_eq!(secret.expose(), "s3cret");
    }
}
