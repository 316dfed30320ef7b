//! Configurable DNS server.
//!
//! # A
//!
//! sdns serves a response to `A` class queries for each name matched by a configured
//! [`Domain`][`crate::domain::Domain`]. Each response carries a single address, picked from the
//! domain's `addresses` in round-robin order.
//!
//! E.g. with config:
//! ```json
//! {
//!   "domains": [
//!     { "name": "*.example.com", "addresses": ["10.0.0.1", "10.0.0.2"] }
//!   ],
//!   ...
//! }
//! ```
//!
//! Two consecutive `A` class queries for `www.example.com` would return:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 1053 www.example.com +short A
//! 10.0.0.2
//! ❯ dig @127.0.0.1 -p 1053 www.example.com +short A
//! 10.0.0.1
//! ```
//!
//! Which of the two comes first depends on when the domain was loaded.
//!
//! # NS
//!
//! sdns serves a response to `NS` class queries with one record per entry of the matched
//! domain's `nameservers`, in configured order.
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 1053 www.example.com +short NS
//! ns1.example.com.
//! ```
//!
//! # Matching
//!
//! See [`crate::table`]. An exact domain always wins over a wildcard one, and a wildcard
//! `*.example.com` only matches names exactly one label below `example.com`.
//!
//! # Recursion
//!
//! Queries for names without a matching domain, and queries of any type other than `A` or
//! `NS`, are forwarded to the configured [`Config::recursors`][`crate::config::Config::recursors`]
//! one after the other. The answers of the first recursor that replies are returned as-is.
//! When none replies the response has no answers.
//!
//! Messages with an opcode other than `QUERY` always get an empty response.

mod dispatcher;
mod handlers;
pub mod server;

pub use dispatcher::Dispatcher;
pub use server::new;
