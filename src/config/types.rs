//! Raw configuration types for TOML parsing

use super::*;
use crate::scheme::{NtCredential, UsernamePasswordCredential};
use serde::Deserialize;

/// Raw configuration as parsed from TOML
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub logging: Option<RawLoggingConfig>,
    #[serde(default)]
    pub credentials: Vec<RawCredential>,
    pub fallback: Option<RawFallbackConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TryFrom<RawLoggingConfig> for LoggingConfig {
    type Error = ConfigError;

    fn try_from(raw: RawLoggingConfig) -> Result<Self, Self::Error> {
        let format = match raw.format.as_deref() {
            Some("pretty") | None => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown log format: {}",
                    other
                )))
            }
        };

        Ok(Self {
            level: raw.level.unwrap_or_else(|| "info".to_string()),
            format,
        })
    }
}

/// Identity fields and password source shared by credentials and fallbacks
#[derive(Debug, Deserialize, Default)]
pub struct RawLogin {
    pub scheme: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_env: Option<String>,
    pub workstation: Option<String>,
    pub domain: Option<String>,
}

impl RawLogin {
    fn scheme(&self) -> Result<SchemeKind, ConfigError> {
        match self.scheme.as_deref() {
            Some("basic") | Some("digest") | None => Ok(SchemeKind::Basic),
            Some("ntlm") => Ok(SchemeKind::Ntlm),
            Some(other) => Err(ConfigError::Invalid(format!(
                "Unknown authentication scheme: {}",
                other
            ))),
        }
    }

    /// Resolve the login, reading the password from the environment if asked
    fn into_login(self, context: &str) -> Result<LoginConfig, ConfigError> {
        let username = self.username.ok_or_else(|| {
            ConfigError::Invalid(format!("Missing username for {}", context))
        })?;

        let password = match (self.password, self.password_env) {
            (Some(password), None) => Password::new(password),
            (None, Some(var)) => {
                Password::new(std::env::var(&var).map_err(|_| ConfigError::MissingEnv(var))?)
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(format!(
                    "Both password and password_env set for {}",
                    context
                )))
            }
            (None, None) => Password::new(String::new()),
        };

        Ok(LoginConfig {
            username,
            password,
            workstation: self.workstation,
            domain: self.domain,
        })
    }

    fn into_credential(self, context: &str) -> Result<SchemeCredential, ConfigError> {
        let scheme = self.scheme()?;
        let login = self.into_login(context)?;
        let password = login.password.to_secret();

        Ok(match scheme {
            SchemeKind::Basic => UsernamePasswordCredential::new(login.username, password).into(),
            SchemeKind::Ntlm => NtCredential::new(
                login.username,
                password,
                login.workstation.as_deref(),
                login.domain.as_deref(),
            )
            .into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawCredential {
    pub target: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(flatten)]
    pub login: RawLogin,
}

impl TryFrom<RawCredential> for CredentialConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCredential) -> Result<Self, Self::Error> {
        let scheme = raw.login.scheme()?;
        let login = if raw.disabled {
            None
        } else {
            Some(raw.login.into_login(&raw.target)?)
        };

        Ok(Self {
            target: raw.target,
            scheme,
            login,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawFallbackConfig {
    pub kind: Option<String>,
    #[serde(flatten)]
    pub login: RawLogin,
    #[serde(default)]
    pub patterns: Vec<RawPattern>,
}

#[derive(Debug, Deserialize)]
pub struct RawPattern {
    pub pattern: String,
    #[serde(flatten)]
    pub login: RawLogin,
}

impl TryFrom<RawFallbackConfig> for FallbackConfig {
    type Error = ConfigError;

    fn try_from(raw: RawFallbackConfig) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("none") | None => Ok(FallbackConfig::None),
            Some("default") => Ok(FallbackConfig::Default(
                raw.login.into_credential("default fallback")?,
            )),
            Some("patterns") => {
                let patterns = raw
                    .patterns
                    .into_iter()
                    .map(|p| -> Result<(String, SchemeCredential), ConfigError> {
                        let credential = p.login.into_credential(&p.pattern)?;
                        Ok((p.pattern, credential))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FallbackConfig::Patterns(patterns))
            }
            Some(other) => Err(ConfigError::Invalid(format!(
                "Unknown fallback kind: {}",
                other
            ))),
        }
    }
}
