//! Authentication scheme families and the credentials they produce
//!
//! A scheme family fixes the identity layout stored per target:
//! - Basic/Digest: `[username]`
//! - NTLM: `[username, workstation, domain]`

mod credentials;

pub use credentials::{NtCredential, UsernamePasswordCredential};

use crate::Secret;

/// Identity layout of an authentication scheme family
pub trait SchemeFamily: Send + Sync + 'static {
    /// Short name used in logs and errors
    const NAME: &'static str;

    /// Names of the identity fields, by position
    const IDENTITY_FIELDS: &'static [&'static str];
}

/// Basic and Digest authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Basic;

impl SchemeFamily for Basic {
    const NAME: &'static str = "basic";
    const IDENTITY_FIELDS: &'static [&'static str] = &["username"];
}

/// NTLM authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ntlm;

impl SchemeFamily for Ntlm {
    const NAME: &'static str = "ntlm";
    const IDENTITY_FIELDS: &'static [&'static str] = &["username", "workstation", "domain"];
}

/// A credential ready to answer an authentication challenge
#[derive(Debug, Clone)]
pub enum SchemeCredential {
    /// Username and password (Basic, Digest)
    UsernamePassword(UsernamePasswordCredential),
    /// NTLM credential with workstation and domain
    Nt(NtCredential),
}

impl SchemeCredential {
    pub fn username(&self) -> &str {
        match self {
            SchemeCredential::UsernamePassword(c) => c.username(),
            SchemeCredential::Nt(c) => c.username(),
        }
    }

    pub fn password(&self) -> &Secret {
        match self {
            SchemeCredential::UsernamePassword(c) => c.password(),
            SchemeCredential::Nt(c) => c.password(),
        }
    }

    /// Name of the scheme family this credential belongs to
    pub fn scheme(&self) -> &'static str {
        match self {
            SchemeCredential::UsernamePassword(_) => Basic::NAME,
            SchemeCredential::Nt(_) => Ntlm::NAME,
        }
    }

    pub fn as_nt(&self) -> Option<&NtCredential> {
        match self {
            SchemeCredential::Nt(c) => Some(c),
            SchemeCredential::UsernamePassword(_) => None,
        }
    }

    pub fn as_username_password(&self) -> Option<&UsernamePasswordCredential> {
        match self {
            SchemeCredential::UsernamePassword(c) => Some(c),
            SchemeCredential::Nt(_) => None,
        }
    }
}

impl From<UsernamePasswordCredential> for SchemeCredential {
    fn from(c: UsernamePasswordCredential) -> Self {
        SchemeCredential::UsernamePassword(c)
    }
}

impl From<NtCredential> for SchemeCredential {
    fn from(c: NtCredential) -> Self {
        SchemeCredential::Nt(c)
    }
}
