//! Exact and wildcard lookup over the configured [`Domain`]s.
//!
//! A [`DomainTable`] holds two disjoint indexes. Domains configured with a `*.` prefix are keyed
//! by their suffix (`*.example.com` under `.example.com`) in the wildcard index, everything else
//! by its full name in the exact index.
//!
//! Lookup tries the exact index first. On a miss the name is cut at its *first* `.` and the
//! remainder is tried against the wildcard index. Only that single level is attempted:
//! `a.b.example.com` matches `*.b.example.com` but never `*.example.com`.

use crate::domain::{Domain, SEPARATOR};
use crate::error::Error;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DomainTable {
    exact: HashMap<String, Arc<Domain>>,
    wildcard: HashMap<String, Arc<Domain>>,
}

impl DomainTable {
    /// Build a table from configured domains. When several domains share a key the last one
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedWildcard`] if a wildcard name isn't of the form `*.suffix`, or
    /// [`Error::EmptyAddresses`] for a domain without addresses.
    pub fn build<'a>(domains: impl IntoIterator<Item = &'a Domain>) -> Result<Self, Error> {
        let mut table = DomainTable::default();
        for domain in domains {
            domain.validate()?;
            let (index, key) = match domain.wildcard_suffix()? {
                Some(suffix) => (&mut table.wildcard, suffix.to_lowercase()),
                None => (&mut table.exact, domain.name.to_lowercase()),
            };
            debug!(
                domain = %domain.name,
                key = %key,
                addresses = ?domain.addresses,
                nameservers = ?domain.nameservers,
                "loaded"
            );
            index.insert(key, Arc::new(domain.clone()));
        }
        Ok(table)
    }

    /// Find the domain serving `name`, preferring an exact match over a wildcard one.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<Domain>> {
        if name.is_empty() {
            return None;
        }

        if let Some(domain) = self.exact.get(name) {
            return Some(Arc::clone(domain));
        }

        let parent = name.find(SEPARATOR)?;
        self.wildcard.get(&name[parent..]).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`DomainTable`] that can be swapped out while queries are being answered. Readers see
/// either the whole old table or the whole new one.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SharedTable {
    current: ArcSwap<DomainTable>,
}

impl SharedTable {
    /// # Errors
    ///
    /// See [`DomainTable::build`].
    pub fn new<'a>(domains: impl IntoIterator<Item = &'a Domain>) -> Result<Self, Error> {
        Ok(SharedTable {
            current: ArcSwap::from_pointee(DomainTable::build(domains)?),
        })
    }

    /// Replace the table with one built from `domains`. The current table is kept if the new
    /// one can't be built.
    ///
    /// # Errors
    ///
    /// See [`DomainTable::build`].
    pub fn reload<'a>(&self, domains: impl IntoIterator<Item = &'a Domain>) -> Result<(), Error> {
        let table = DomainTable::build(domains)?;
        debug!(domains = table.len(), "reloaded");
        self.current.store(Arc::new(table));
        Ok(())
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<Domain>> {
        self.current.load().find(name)
    }

    /// A snapshot of the current table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DomainTable> {
        self.current.load_full()
    }
}
