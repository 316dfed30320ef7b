//! Error types.

use std::net::SocketAddr;
use trust_dns_client::error::ClientError;
use trust_dns_proto::error::ProtoError;
use trust_dns_proto::rr::RecordType;

/// Error enumerates the possible sdns error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a [`Config`][crate::config::Config] doesn't specify a non-zero `port`.
    #[error("a port must be specified")]
    MissingPort,

    /// Returned when a configured domain name starts with the wildcard marker `*` but the
    /// marker isn't immediately followed by `.`, e.g. `*foo.example.com`.
    #[error("malformed wildcard domain \"{0}\": '*' must be followed by '.'")]
    MalformedWildcard(String),

    /// Returned when a configured domain has no addresses to hand out.
    #[error("domain \"{0}\" has no addresses")]
    EmptyAddresses(String),

    /// Returned when a queried name has neither an exact nor a wildcard match in the
    /// [`DomainTable`][crate::table::DomainTable]. Triggers recursion.
    #[error("no domain for \"{0}\"")]
    DomainNotFound(String),

    /// Returned for query types other than `A` and `NS`. Triggers recursion.
    #[error("unsupported query type {0}")]
    UnsupportedQueryType(RecordType),

    /// Returned when an inbound message carries no questions.
    #[error("no questions provided")]
    NoQuestions,

    /// Returned when forwarding a query to an upstream recursor fails.
    #[error("errored recursing to {server}")]
    UpstreamForwarding {
        server: SocketAddr,
        #[source]
        source: ClientError,
    },

    /// Returned when an answer record can't be assembled from configured data, e.g. an
    /// address that isn't an IPv4 literal in an `A` answer.
    #[error("couldn't create answer record: {0}")]
    RecordConstruction(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [trying to load a `Config`][crate::config::Config::try_from_file] fails
    /// due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}

impl Error {
    /// Whether a failure to answer locally should fall back to the configured recursors.
    #[must_use]
    pub fn recursable(&self) -> bool {
        matches!(self, Error::DomainNotFound(_) | Error::UnsupportedQueryType(_))
    }
}
