//! sdns
//!
//! A small DNS responder serving `A` and `NS` answers from a static list of domains, with
//! [wildcard][crate::table] support and round-robin over each domain's addresses. Queries it
//! can't answer are forwarded to upstream [recursors][crate::upstream].
//!
//! The domain list can be [reloaded][crate::table::SharedTable::reload] while serving.
//!
#![warn(clippy::pedantic)]

pub mod config;
pub mod dns;
pub mod domain;
pub mod error;
pub mod resolver;
pub mod table;
pub mod upstream;

pub use config::{Config, SharedConfig};
pub use dns::new as new_dns;
pub use dns::Dispatcher;
pub use domain::Domain;
pub use table::{DomainTable, SharedTable};
pub use upstream::{DynUpstream, UdpUpstream, Upstream};
