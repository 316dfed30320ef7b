//! Configured domain records.

use crate::error::Error;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Marks a domain name as matching any subdomain of its suffix, e.g. `*.example.com`.
pub const WILDCARD_MARKER: char = '*';

/// Separates the labels of a domain name.
pub const SEPARATOR: char = '.';

/// A configured domain: the addresses handed out for `A` queries and the nameservers listed
/// for `NS` queries.
///
/// E.g. with config:
/// ```json
/// { "name": "*.example.com", "addresses": ["10.0.0.1", "10.0.0.2"], "nameservers": ["ns1.example.com"] }
/// ```
///
/// `A` queries for `www.example.com` alternate between the two addresses.
#[derive(Deserialize, Debug, Clone)]
pub struct Domain {
    /// Name of the domain, e.g. `mysite.com`. A `*.` prefix makes the domain match any
    /// name one level below the suffix: `*.mysite.com` matches `haha.mysite.com`.
    pub name: String,

    /// IP addresses served for the domain, in rotation.
    pub addresses: Vec<String>,

    /// Nameservers responsible for the domain.
    #[serde(default)]
    pub nameservers: Vec<String>,

    #[serde(skip)]
    cursor: Cursor,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        addresses: impl IntoIterator<Item = impl Into<String>>,
        nameservers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Domain {
            name: name.into(),
            addresses: addresses.into_iter().map(Into::into).collect(),
            nameservers: nameservers.into_iter().map(Into::into).collect(),
            cursor: Cursor::default(),
        }
    }

    /// Returns the next address of the pool in round-robin order.
    ///
    /// Any run of `addresses.len()` consecutive calls visits every address exactly once, also
    /// when the calls race from several threads.
    ///
    /// # Panics
    ///
    /// Panics if the domain has no addresses. [`Domain::validate`] rejects such domains when
    /// configuration is loaded.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn get_address(&self) -> &str {
        let idx = self.cursor.advance() % self.addresses.len() as u64;
        &self.addresses[idx as usize]
    }

    /// Returns the suffix a wildcard domain is keyed under (`.example.com` for
    /// `*.example.com`), or `None` for an exact domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedWildcard`] if the wildcard marker isn't followed by `.`.
    pub fn wildcard_suffix(&self) -> Result<Option<&str>, Error> {
        match self.name.strip_prefix(WILDCARD_MARKER) {
            None => Ok(None),
            Some(suffix) if suffix.starts_with(SEPARATOR) => Ok(Some(suffix)),
            Some(_) => Err(Error::MalformedWildcard(self.name.clone())),
        }
    }

    /// Check the domain can be loaded and served.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyAddresses`] for a domain without addresses, or
    /// [`Error::MalformedWildcard`] for a badly formed wildcard name.
    pub fn validate(&self) -> Result<(), Error> {
        if self.addresses.is_empty() {
            return Err(Error::EmptyAddresses(self.name.clone()));
        }
        self.wildcard_suffix().map(|_| ())
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.addresses == other.addresses
            && self.nameservers == other.nameservers
    }
}

impl Eq for Domain {}

/// Rotation counter. Seeded from the clock so restarts don't always begin at the same address.
#[derive(Debug)]
struct Cursor(AtomicU64);

impl Cursor {
    fn starting_at(n: u64) -> Self {
        Cursor(AtomicU64::new(n))
    }

    // fetch_add wraps on overflow.
    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

impl Default for Cursor {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn default() -> Self {
        Cursor::starting_at(OffsetDateTime::now_utc().unix_timestamp_nanos() as u64)
    }
}

impl Clone for Cursor {
    fn clone(&self) -> Self {
        Cursor::starting_at(self.0.load(Ordering::Relaxed))
    }
}
