use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Threshold assumed when a snapshot permission name carries none.
pub const DEFAULT_THRESHOLD: u32 = 1;

/// A permission name together with its required-signature threshold.
///
/// Rendered and parsed in the composite form `name(threshold)`, e.g. `active(1)`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    pub name: String,
    pub threshold: u32,
}

impl PermissionKey {
    pub fn new(name: impl Into<String>, threshold: u32) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }
}

impl FromStr for PermissionKey {
    type Err = TypeError;

    /// Parses `active(2)`; a bare `active` gets [`DEFAULT_THRESHOLD`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TypeError::InvalidPermissionKey(s.to_string());
        let (name, threshold) = match s.split_once('(') {
            Some((name, rest)) => {
                let digits = rest.strip_suffix(')').ok_or_else(invalid)?;
                (name, digits.trim().parse().map_err(|_| invalid())?)
            }
            None => (s, DEFAULT_THRESHOLD),
        };
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(name, threshold))
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.threshold)
    }
}

impl fmt::Debug for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionKey({self})")
    }
}

/// Expected permission structure of one account: composite key to the
/// authorization descriptor recorded in the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeMap<PermissionKey, String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `;`-separated list of `name[:descriptor]` entries.
    ///
    /// Entries whose name does not parse are dropped; an empty blob yields an
    /// empty set.
    pub fn parse_blob(blob: &str) -> Self {
        let mut set = Self::new();
        for entry in blob.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, descriptor) = entry.split_once(':').unwrap_or((entry, ""));
            if let Ok(key) = name.parse() {
                set.insert(key, descriptor.trim());
            }
        }
        set
    }

    pub fn insert(&mut self, key: PermissionKey, descriptor: impl Into<String>) -> Option<String> {
        self.0.insert(key, descriptor.into())
    }

    pub fn get(&self, key: &PermissionKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PermissionKey, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }
}

/// Returns `true` if `authority` (e.g. `alice@active`) is listed in `descriptor`.
///
/// Descriptors are comma or whitespace separated tokens; matching is exact per
/// token.
pub fn descriptor_contains(descriptor: &str, authority: &str) -> bool {
    descriptor
        .split(|c: char| c == ',' || c.is_whitespace())
        .any(|token| token == authority)
}
