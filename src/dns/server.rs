use crate::config::SharedConfig;
use crate::dns::handlers::Handler;
use crate::dns::Dispatcher;
use std::sync::Arc;
use tokio::net::UdpSocket;
use trust_dns_server::ServerFuture;

/// Bind the configured UDP address and serve queries through `dispatcher`.
///
/// # Errors
///
/// Returns an error if the config has no usable port or the socket can't be bound.
pub async fn new(
    config: SharedConfig,
    dispatcher: Arc<Dispatcher>,
) -> anyhow::Result<ServerFuture<Handler>> {
    let udp_addr = config.bind_addr()?;
    Ok(with_socket(UdpSocket::bind(udp_addr).await?, dispatcher))
}

/// Serve queries arriving on an already bound `socket`.
pub fn with_socket(socket: UdpSocket, dispatcher: Arc<Dispatcher>) -> ServerFuture<Handler> {
    let dns_handler = Handler::new(dispatcher);
    let mut dns_server = ServerFuture::new(dns_handler);
    dns_server.register_socket(socket);
    dns_server
}
