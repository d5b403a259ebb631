//! Target URIs used as exact-match store keys

use super::StoreError;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

/// Characters that may not appear anywhere in a URI reference
const EXCLUDED: &[char] = &['"', '<', '>', '\\', '^', '`', '{', '|', '}'];

/// A URI reference identifying the endpoint or realm a credential applies to
///
/// Equality, ordering and hashing use the URI text exactly as supplied.
/// `http://h/` and `http://h` are distinct targets even though they parse
/// to the same URL. Relative references such as `sparql/endpoint` are valid
/// targets; they have no URL, host or port.
#[derive(Clone)]
pub struct Target {
    uri: String,
    url: Option<Url>,
}

impl Target {
    /// Parse a target, rejecting blank text and malformed URI references
    pub fn parse(uri: &str) -> Result<Self, StoreError> {
        if uri.trim().is_empty() {
            return Err(StoreError::MissingTarget);
        }

        let invalid = |reason: String| StoreError::InvalidTarget {
            target: uri.to_string(),
            reason,
        };

        if let Some(c) = uri
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || EXCLUDED.contains(c))
        {
            return Err(invalid(format!("illegal character {:?}", c)));
        }
        if !valid_escapes(uri) {
            return Err(invalid("malformed percent escape".to_string()));
        }

        let url = match Url::parse(uri) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => None,
            Err(e) => return Err(invalid(e.to_string())),
        };

        Ok(Self {
            uri: uri.to_string(),
            url,
        })
    }

    /// The URI text this target was created from
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// The parsed URL, `None` for relative references
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn is_absolute(&self) -> bool {
        self.url.is_some()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.as_ref().and_then(Url::host_str)
    }

    /// Explicit port, or the scheme's default port
    pub fn port(&self) -> Option<u16> {
        self.url.as_ref().and_then(Url::port_or_known_default)
    }
}

/// Every `%` must start a two-digit hex escape
fn valid_escapes(uri: &str) -> bool {
    let bytes = uri.as_bytes();
    bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || (i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit())
    })
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Target {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri.cmp(&other.uri)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Target").field(&self.uri).finish()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl FromStr for Target {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Target {
    type Error = StoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Target {
    type Error = StoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_target_rejected() {
        assert!(matches!(Target::parse(""), Err(StoreError::MissingTarget)));
        assert!(matches!(Target::parse("   "), Err(StoreError::MissingTarget)));
    }

    #[test]
    fn test_relative_target_accepted() {
        for uri in ["sparql/endpoint", "/just/a/path", "//host/only", "no-scheme"] {
            let target = Target::parse(uri).unwrap();
            assert_eq!(target.as_str(), uri);
            assert!(!target.is_absolute());
            assert!(target.url().is_none());
            assert_eq!(target.host(), None);
            assert_eq!(target.port(), None);
        }
    }

    #[test]
    fn test_malformed_target_rejected() {
        for uri in ["not a uri", "http://h/a b", "http://h/{x}", "http://h/%zz", "ends%2"] {
            let result = Target::parse(uri);
            assert!(
                matches!(result, Err(StoreError::InvalidTarget { .. })),
                "{uri:?}"
            );
        }
        assert!(Target::parse("http://h/a%20b").is_ok());
    }

    #[test]
    fn test_hostless_absolute_target() {
        let target = Target::parse("urn:example:realm").unwrap();
        assert!(target.is_absolute());
        assert_eq!(target.host(), None);
    }

    #[test]
    fn test_equality_is_literal() {
        let with_slash = Target::parse("http://h/").unwrap();
        let without_slash = Target::parse("http://h").unwrap();
        let upper = Target::parse("HTTP://h/").unwrap();

        assert_ne!(with_slash, without_slash);
        assert_ne!(with_slash, upper);
        assert_eq!(with_slash, Target::parse("http://h/").unwrap());

        // The parsed URLs agree even though the targets do not
        assert_eq!(with_slash.url(), without_slash.url());
        assert!(with_slash.url().is_some());
    }

    #[test]
    fn test_host_and_default_port() {
        let target = Target::parse("https://Example.org/sparql").unwrap();
        assert_eq!(target.host(), Some("example.org"));
        assert_eq!(target.port(), Some(443));

        let target = Target::parse("http://example.org:3030/ds").unwrap();
        assert_eq!(target.port(), Some(3030));
        assert_eq!(target.to_string(), "http://example.org:3030/ds");
    }
}
