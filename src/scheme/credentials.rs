//! Scheme-specific credential objects

use crate::Secret;
use base64::{engine::general_purpose::STANDARD, Engine};

/// User name and password, answered to Basic and Digest challenges
#[derive(Debug, Clone)]
pub struct UsernamePasswordCredential {
    username: String,
    password: Secret,
}

impl UsernamePasswordCredential {
    pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Secret {
        &self.password
    }

    /// `Authorization` header value for preemptive Basic authentication
    pub fn basic_authorization(&self) -> Secret {
        let credentials = format!("{}:{}", self.username, self.password.expose());
        let encoded = STANDARD.encode(credentials.as_bytes());
        Secret::new(format!("Basic {}", encoded))
    }
}

/// NTLM credential
///
/// Workstation and domain are held upper-cased. An empty value is kept as
/// given; only `None` means unset.
#[derive(Debug, Clone)]
pub struct NtCredential {
    username: String,
    password: Secret,
    workstation: Option<String>,
    domain: Option<String>,
}

impl NtCredential {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<Secret>,
        workstation: Option<&str>,
        domain: Option<&str>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            workstation: workstation.map(str::to_uppercase),
            domain: domain.map(str::to_uppercase),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Secret {
        &self.password
    }

    /// ID of the local workstation
    pub fn workstation(&self) -> Option<&str> {
        self.workstation.as_deref()
    }

    /// Domain being authenticated in (not necessarily the workstation's)
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// `DOMAIN\username`, or just the user name when the domain is unset or empty
    pub fn principal(&self) -> String {
        match self.domain.as_deref() {
            Some(domain) if !domain.is_empty() => format!("{}\\{}", domain, self.username),
            _ => self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_authorization_header() {
        let cred = UsernamePasswordCredential::new("Aladdin", "open sesame");
        assert_eq!(
            cred.basic_authorization().expose(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_nt_credential_fields() {
        let cred = NtCredential::new("alice", "s3cret", Some("WS1"), Some("corp"));
        assert_eq!(cred.username(), "alice");
        assert_eq!(cred.password().expose(), "s3cret");
        assert_eq!(cred.workstation(), Some("WS1"));
        assert_eq!(cred.domain(), Some("CORP"));
        assert_eq!(cred.principal(), "CORP\\alice");
    }

    #[test]
    fn test_nt_credential_without_domain() {
        let cred = NtCredential::new("alice", "s3cret", None, None);
        assert_eq!(cred.workstation(), None);
        assert_eq!(cred.domain(), None);
        assert_eq!(cred.principal(), "alice");

        let cred = NtCredential::new("alice", "s3cret", Some(""), Some(""));
        assert_eq!(cred.workstation(), Some(""));
        assert_eq!(cred.domain(), Some(""));
        assert_eq!(cred.principal(), "alice");
    }

    #[test]
    fn test_nt_credential_workstation_upper_cased() {
        let cred = NtCredential::new("carol", "pw", Some("laptop"), Some("lab"));
        assert_eq!(cred.workstation(), Some("LAPTOP"));
        assert_eq!(cred.domain(), Some("LAB"));
        assert_eq!(cred.principal(), "LAB\\carol");
    }

    #[test]
    fn test_debug_redacts_password() {
        let cred = NtCredential::new("alice", "s3cret", Some("WS1"), Some("CORP"));
        let rendered = format!("{:?}", cred);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
    }
}
