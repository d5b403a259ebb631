//! Configuration system for Realmkey
//!
//! Loads scoped credentials, the fallback policy and logging settings from
//! TOML files. Passwords may be given inline or read from environment
//! variables.

mod types;

pub use types::*;

use crate::authenticator::{
    FallbackAuthenticator, ScopedAuthenticator, ScopedBasicAuthenticator, ScopedNtAuthenticator,
};
use crate::scheme::SchemeCredential;
use crate::storage::{CredentialEntry, Target};
use crate::{AuthError, Password};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),
}

/// Main Realmkey configuration
#[derive(Debug)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Scoped credentials, in file order
    pub credentials: Vec<CredentialConfig>,
    /// Policy for targets without scoped credentials
    pub fallback: FallbackConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_home(path.as_ref());
        let path = path.as_path();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        info!(
            path = %path.display(),
            credentials = config.credentials.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_raw(raw)
    }

    /// Convert from raw TOML config to validated config
    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let logging = raw.logging.unwrap_or_default().try_into()?;
        let fallback = raw.fallback.unwrap_or_default().try_into()?;

        let credentials = raw
            .credentials
            .into_iter()
            .map(|c| c.try_into())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            logging,
            credentials,
            fallback,
        })
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("realmkey")
            .join("config.toml")
    }

    /// Build the scoped authenticators described by this configuration
    ///
    /// Each scheme family's entries are validated as one batch, so a bad
    /// entry fails the whole family. A target listed twice for the same
    /// family is rejected.
    pub fn scoped_authenticators(self) -> Result<ScopedAuthenticators, AuthError> {
        let fallback = self.fallback.build()?;

        let mut basic = Vec::new();
        let mut ntlm = Vec::new();
        let mut seen: HashSet<(SchemeKind, Target)> = HashSet::new();
        for credential in self.credentials {
            let target = Target::parse(&credential.target)?;
            if !seen.insert((credential.scheme, target.clone())) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate target {} for scheme {}",
                    target,
                    credential.scheme.name()
                ))
                .into());
            }

            let entry = credential.login.map(|login| login.into_entry(credential.scheme));
            match credential.scheme {
                SchemeKind::Basic => basic.push((target, entry)),
                SchemeKind::Ntlm => ntlm.push((target, entry)),
            }
        }

        Ok(ScopedAuthenticators {
            basic: ScopedBasicAuthenticator::from_entries(basic)?
                .with_fallback(Arc::clone(&fallback)),
            ntlm: ScopedNtAuthenticator::from_entries(ntlm)?.with_fallback(fallback),
        })
    }
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.to_str().and_then(|p| p.strip_prefix("~/")) {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => path.to_path_buf(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            credentials: vec![],
            fallback: FallbackConfig::None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Format: "json" or "pretty"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
}

/// Scheme family of a configured credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// Basic and Digest
    Basic,
    /// NTLM
    Ntlm,
}

impl SchemeKind {
    pub fn name(self) -> &'static str {
        match self {
            SchemeKind::Basic => "basic",
            SchemeKind::Ntlm => "ntlm",
        }
    }
}

/// A configured scoped credential
#[derive(Debug)]
pub struct CredentialConfig {
    /// Target URI, exactly as written
    pub target: String,
    pub scheme: SchemeKind,
    /// `None` for targets explicitly configured without credentials
    pub login: Option<LoginConfig>,
}

/// Identity fields and password of a configured credential
#[derive(Debug)]
pub struct LoginConfig {
    pub username: String,
    pub password: Password,
    pub workstation: Option<String>,
    pub domain: Option<String>,
}

impl LoginConfig {
    fn into_entry(self, scheme: SchemeKind) -> CredentialEntry {
        match scheme {
            SchemeKind::Basic => CredentialEntry::new([self.username], self.password),
            SchemeKind::Ntlm => CredentialEntry::new(
                [
                    self.username,
                    self.workstation.unwrap_or_default(),
                    self.domain.unwrap_or_default(),
                ],
                self.password,
            ),
        }
    }
}

/// Fallback policy configuration
#[derive(Debug)]
pub enum FallbackConfig {
    /// No credentials for unscoped targets
    None,
    /// One credential for every unscoped target
    Default(SchemeCredential),
    /// Glob patterns over the target URI, first match wins
    Patterns(Vec<(String, SchemeCredential)>),
}

impl FallbackConfig {
    /// Build the fallback authenticator
    pub fn build(self) -> Result<Arc<dyn FallbackAuthenticator>, ConfigError> {
        use crate::authenticator::{DefaultCredentials, NoCredentials, PatternFallback};

        Ok(match self {
            FallbackConfig::None => Arc::new(NoCredentials),
            FallbackConfig::Default(credential) => Arc::new(DefaultCredentials::new(credential)),
            FallbackConfig::Patterns(patterns) => {
                let mut fallback = PatternFallback::new();
                for (pattern, credential) in patterns {
                    fallback.add_pattern(&pattern, credential).map_err(|e| {
                        ConfigError::Invalid(format!("Invalid fallback pattern {}: {}", pattern, e))
                    })?;
                }
                Arc::new(fallback)
            }
        })
    }
}

/// The authenticators built from a configuration
pub struct ScopedAuthenticators {
    pub basic: ScopedBasicAuthenticator,
    pub ntlm: ScopedNtAuthenticator,
}

impl ScopedAuthenticators {
    /// Resolve a target, preferring NTLM entries over Basic ones
    pub fn resolve(&self, target: &Target) -> Option<SchemeCredential> {
        if self.ntlm.get_credentials(target).is_some() {
            return self.ntlm.resolve_credentials(target);
        }
        self.basic.resolve_credentials(target)
    }

    /// Number of targets with scoped credentials across both families
    pub fn len(&self) -> usize {
        self.basic.store().len() + self.ntlm.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
