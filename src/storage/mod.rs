//! Scoped credential storage
//!
//! Provides an exact-match store from target URI to identity and password,
//! generic over the authentication scheme family whose identity layout it
//! enforces.

mod target;

pub use target::Target;

use crate::scheme::SchemeFamily;
use crate::Password;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Storage-related errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Target URI cannot be empty")]
    MissingTarget,

    #[error("Invalid target URI {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error(
        "Credentials for {target} should contain at least {expected} identity fields for {family} ({fields}), got {actual}"
    )]
    IdentityTooShort {
        target: String,
        family: &'static str,
        fields: String,
        expected: usize,
        actual: usize,
    },
}

/// Ordered identity fields, e.g. `[username]` or `[username, workstation, domain]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityRecord(Vec<String>);

impl IdentityRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Get the field at a position
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// The first field, which every scheme family uses for the user name
    pub fn username(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for IdentityRecord {
    fn from(fields: [S; N]) -> Self {
        Self(fields.into_iter().map(Into::into).collect())
    }
}

impl FromIterator<String> for IdentityRecord {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The identity and password stored for one target
#[derive(Debug)]
pub struct CredentialEntry {
    identity: IdentityRecord,
    secret: Password,
}

impl CredentialEntry {
    pub fn new(identity: impl Into<IdentityRecord>, secret: impl Into<Password>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    pub fn identity(&self) -> &IdentityRecord {
        &self.identity
    }

    pub fn secret(&self) -> &Password {
        &self.secret
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.username()
    }
}

/// Exact-match credential store for one scheme family
///
/// Every entry is validated against the family's identity layout before it
/// is inserted. Reads take a shared lock; inserts take the exclusive lock.
pub struct CredentialStore<F> {
    entries: RwLock<HashMap<Target, Arc<CredentialEntry>>>,
    family: PhantomData<fn() -> F>,
}

impl<F: SchemeFamily> CredentialStore<F> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            family: PhantomData,
        }
    }

    /// Create a store holding a single entry
    pub fn with_entry(target: Target, entry: CredentialEntry) -> Result<Self, StoreError> {
        let store = Self::new();
        store.insert(target, entry)?;
        Ok(store)
    }

    /// Create a store from a map of targets to optional entries
    ///
    /// `None` values mark targets that explicitly have no credentials and
    /// are skipped. Fails without building a store if any entry is invalid.
    pub fn from_entries<I>(entries: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (Target, Option<CredentialEntry>)>,
    {
        let store = Self::new();
        store.extend(entries)?;
        Ok(store)
    }

    /// Add or overwrite the entry for a target, returning the previous one
    pub fn insert(
        &self,
        target: Target,
        entry: CredentialEntry,
    ) -> Result<Option<Arc<CredentialEntry>>, StoreError> {
        Self::validate(&target, &entry)?;

        debug!(uri = %target, family = F::NAME, "Storing scoped credentials");
        let mut entries = self.entries.write();
        Ok(entries.insert(target, Arc::new(entry)))
    }

    /// Add or overwrite a batch of entries
    ///
    /// The batch is validated in full before anything is inserted, so a
    /// failure leaves the store untouched. Returns the number of entries
    /// inserted.
    pub fn extend<I>(&self, entries: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = (Target, Option<CredentialEntry>)>,
    {
        let mut batch = Vec::new();
        for (target, entry) in entries {
            let Some(entry) = entry else {
                trace!(uri = %target, family = F::NAME, "Skipping target without credentials");
                continue;
            };
            Self::validate(&target, &entry)?;
            batch.push((target, Arc::new(entry)));
        }

        let inserted = batch.len();
        let mut stored = self.entries.write();
        for (target, entry) in batch {
            debug!(uri = %target, family = F::NAME, "Storing scoped credentials");
            stored.insert(target, entry);
        }

        Ok(inserted)
    }

    /// Look up the entry for a target (exact match only)
    pub fn get(&self, target: &Target) -> Option<Arc<CredentialEntry>> {
        self.entries.read().get(target).cloned()
    }

    pub fn contains(&self, target: &Target) -> bool {
        self.entries.read().contains_key(target)
    }

    /// All stored targets, sorted
    pub fn targets(&self) -> Vec<Target> {
        let mut targets: Vec<Target> = self.entries.read().keys().cloned().collect();
        targets.sort();
        targets
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn validate(target: &Target, entry: &CredentialEntry) -> Result<(), StoreError> {
        let expected = F::IDENTITY_FIELDS.len();
        let actual = entry.identity.len();
        if actual < expected {
            return Err(StoreError::IdentityTooShort {
                target: target.to_string(),
                family: F::NAME,
                fields: F::IDENTITY_FIELDS
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("{} = {}", i, name))
                    .collect::<Vec<_>>()
                    .join(", "),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl<F: SchemeFamily> Default for CredentialStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SchemeFamily> fmt::Debug for CredentialStore<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("family", &F::NAME)
            .field("targets", &self.targets())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{Basic, Ntlm};

    fn target(uri: &str) -> Target {
        Target::parse(uri).unwrap()
    }

    fn nt_entry(user: &str, password: &str) -> CredentialEntry {
        CredentialEntry::new([user, "WS1", "CORP"], password)
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = CredentialStore::<Ntlm>::new();
        store
            .insert(target("https://example.org/"), nt_entry("alice", "s3cret"))
            .unwrap();

        let entry = store.get(&target("https://example.org/")).unwrap();
        assert_eq!(entry.username(), Some("alice"));
        assert_eq!(entry.identity().get(1), Some("WS1"));
        assert_eq!(entry.identity().get(2), Some("CORP"));
        assert_eq!(entry.secret().expose(), "s3cret");
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let store = CredentialStore::<Basic>::new();
        store
            .insert(target("http://h/"), CredentialEntry::new(["bob"], "pw"))
            .unwrap();

        assert!(store.get(&target("http://h/")).is_some());
        assert!(store.get(&target("http://h")).is_none());
        assert!(store.get(&target("http://h/sub")).is_none());
        assert!(store.get(&target("https://h/")).is_none());
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let store = CredentialStore::<Ntlm>::new();
        let t = target("https://example.org/");

        let previous = store.insert(t.clone(), nt_entry("alice", "one")).unwrap();
        assert!(previous.is_none());

        let previous = store.insert(t.clone(), nt_entry("carol", "two")).unwrap();
        assert_eq!(previous.unwrap().username(), Some("alice"));

        let entry = store.get(&t).unwrap();
        assert_eq!(entry.username(), Some("carol"));
        assert_eq!(entry.secret().expose(), "two");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_short_identity_rejected() {
        let store = CredentialStore::<Ntlm>::new();
        let result = store.insert(
            target("https://example.org/"),
            CredentialEntry::new(["alice", "WS1"], "pw"),
        );

        assert!(matches!(
            result,
            Err(StoreError::IdentityTooShort {
                expected: 3,
                actual: 2,
                ..
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_extra_identity_fields_accepted() {
        let store = CredentialStore::<Basic>::new();
        store
            .insert(
                target("https://example.org/"),
                CredentialEntry::new(["alice", "ignored"], "pw"),
            )
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bulk_skips_none_entries() {
        let store = CredentialStore::<Ntlm>::from_entries(vec![
            (target("https://a.example/"), Some(nt_entry("alice", "pw"))),
            (target("https://b.example/"), None),
        ])
        .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(&target("https://b.example/")).is_none());
        assert!(!store.contains(&target("https://b.example/")));
    }

    #[test]
    fn test_bulk_is_atomic() {
        let store = CredentialStore::<Ntlm>::new();
        store
            .insert(target("https://keep.example/"), nt_entry("keep", "pw"))
            .unwrap();

        let result = store.extend(vec![
            (target("https://a.example/"), Some(nt_entry("alice", "pw"))),
            (
                target("https://b.example/"),
                Some(CredentialEntry::new(["bob"], "pw")),
            ),
        ]);

        assert!(matches!(result, Err(StoreError::IdentityTooShort { .. })));
        assert_eq!(store.targets(), vec![target("https://keep.example/")]);
    }

    #[test]
    fn test_empty_identity_rejected_for_basic() {
        let result = CredentialStore::<Basic>::from_entries(vec![(
            target("https://a.example/"),
            Some(CredentialEntry::new(IdentityRecord::default(), "pw")),
        )]);
        assert!(matches!(
            result,
            Err(StoreError::IdentityTooShort {
                expected: 1,
                actual: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_targets_sorted_and_debug_hides_secrets() {
        let store = CredentialStore::<Basic>::new();
        store
            .insert(target("https://z.example/"), CredentialEntry::new(["z"], "zz-secret"))
            .unwrap();
        store
            .insert(target("https://a.example/"), CredentialEntry::new(["a"], "aa-secret"))
            .unwrap();

        assert_eq!(
            store.targets(),
            vec![target("https://a.example/"), target("https://z.example/")]
        );

        let rendered = format!("{:?}", store);
        assert!(rendered.contains("basic"));
        assert!(!rendered.contains("zz-secret"));
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let store = CredentialStore::<Basic>::new();
        let t = target("https://example.org/");
        store
            .insert(t.clone(), CredentialEntry::new(["alice"], "pw"))
            .unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let entry = store.get(&t).unwrap();
                        assert!(entry.username().is_some());
                    }
                });
            }
            s.spawn(|| {
                for i in 0..100 {
                    store
                        .insert(t.clone(), CredentialEntry::new([format!("user{}", i)], "pw"))
                        .unwrap();
                }
            });
        });

        assert_eq!(store.get(&t).unwrap().username(), Some("user99"));
    }
}
