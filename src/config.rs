use crate::domain::Domain;
use crate::error::Error;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

pub type SharedConfig = Arc<Config>;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "unspecified_address")]
    pub address: IpAddr,
    pub port: Option<u16>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub recursors: Vec<SocketAddr>,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

fn unspecified_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

impl Config {
    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] or [`Error::InvalidJSON`] if the file can't be read or parsed, and
    /// any error of [`Config::validate`].
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// # Errors
    ///
    /// Returns [`Error::MissingPort`] without a non-zero port, and the first error of
    /// [`Domain::validate`] among the configured domains.
    pub fn validate(&self) -> Result<(), Error> {
        self.bind_addr()?;
        self.domains.iter().try_for_each(Domain::validate)
    }

    /// # Errors
    ///
    /// Returns [`Error::MissingPort`] when no non-zero port is configured.
    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        match self.port {
            Some(port) if port != 0 => Ok(SocketAddr::new(self.address, port)),
            _ => Err(Error::MissingPort),
        }
    }

    /// Whether `other` would bind the same socket and recurse to the same servers. Only the
    /// domains of a config can be reloaded at runtime.
    #[must_use]
    pub fn same_listener(&self, other: &Config) -> bool {
        self.address == other.address
            && self.port == other.port
            && self.recursors == other.recursors
    }
}
