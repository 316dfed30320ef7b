//! Forwarding of queries that can't be answered locally.

use crate::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::UdpSocket;
use tracing::info;
use trust_dns_client::client::{AsyncClient, ClientHandle};
use trust_dns_client::error::ClientError;
use trust_dns_client::udp::UdpClientStream;
use trust_dns_proto::op::{Message, Query};

/// `DynUpstream` is a type alias for an [`Upstream`] shared between concurrently handled
/// queries.
#[allow(clippy::module_name_repetitions)]
pub type DynUpstream = Arc<dyn Upstream + Send + Sync>;

/// An async trait describing a single-hop forward of a question to one upstream recursor.
#[async_trait::async_trait]
pub trait Upstream {
    /// Send `query` with recursion desired to `server` and return its reply as-is.
    async fn forward(&self, server: SocketAddr, query: &Query) -> Result<Message, Error>;
}

/// Forwards over UDP with a [`trust_dns_client`] client. Timeouts are the client's own.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpUpstream;

#[async_trait::async_trait]
impl Upstream for UdpUpstream {
    async fn forward(&self, server: SocketAddr, query: &Query) -> Result<Message, Error> {
        let forwarding = move |source: ClientError| Error::UpstreamForwarding { server, source };
        info!(%server, "recursion started");
        let started = Instant::now();

        let stream = UdpClientStream::<UdpSocket>::new(server);
        let (mut client, background) = AsyncClient::connect(stream)
            .await
            .map_err(|err| forwarding(err.into()))?;
        // Runs until `client` is dropped.
        tokio::spawn(background);

        // ClientHandle::query sets recursion desired.
        let response = client
            .query(
                query.name().clone(),
                query.query_class(),
                query.query_type(),
            )
            .await
            .map_err(forwarding)?;

        info!(%server, duration = ?started.elapsed(), "recursion finished");
        Ok(Message::clone(&response))
    }
}
