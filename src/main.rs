use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use sdns::error::Error::DNSError;
use sdns::{Config, Dispatcher, SharedConfig, SharedTable, UdpUpstream};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("sdns".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file.as_deref())?;
    tracing_init(config.debug);

    let table = Arc::new(SharedTable::new(&config.domains)?);
    tracing::info!("loaded {} domains", config.domains.len());
    tracing::info!("recursing to {:?}", &config.recursors);
    let dispatcher = Arc::new(Dispatcher::new(
        table.clone(),
        config.recursors.clone(),
        Arc::new(UdpUpstream),
    ));

    tracing::info!("DNS listening on UDP {}", config.bind_addr()?);
    let dns_server = sdns::dns::new(config.clone(), dispatcher).await?;
    let dns_handle = tokio::spawn(dns_server.block_until_done());

    if let Some(config_file) = config_file {
        spawn_reload(config_file, config.clone(), table);
    }

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(dns_res) = dns_handle => {
            if let Err(err) = dns_res {
                return Err(DNSError(err).into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init(debug: bool) {
    let default_filter = if debug { "sdns=debug" } else { "sdns=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stderr().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<&str>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(config_file)?;
            Ok(Arc::new(config))
        }
    }
}

#[cfg(unix)]
fn spawn_reload(config_file: String, running: SharedConfig, table: Arc<SharedTable>) {
    tokio::spawn(reload_on_hangup(config_file, running, table));
}

#[cfg(not(unix))]
fn spawn_reload(_config_file: String, _running: SharedConfig, _table: Arc<SharedTable>) {
    tracing::debug!("reload on SIGHUP is only supported on unix");
}

/// Reload the domain list from `config_file` on every `SIGHUP`. The listener and recursors
/// stay as they were started.
#[cfg(unix)]
async fn reload_on_hangup(config_file: String, running: SharedConfig, table: Arc<SharedTable>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(err) => {
            tracing::error!("can't listen for SIGHUP, reload disabled: {err}");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        tracing::info!("reloading domains from {config_file}");
        let config = match Config::try_from_file(&config_file) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!("not reloading, invalid config: {err}");
                continue;
            }
        };
        if !running.same_listener(&config) {
            tracing::warn!("address, port and recursors can't change without a restart");
        }
        match table.reload(&config.domains) {
            Ok(()) => tracing::info!("reloaded {} domains", config.domains.len()),
            Err(err) => tracing::error!("not reloading: {err}"),
        }
    }
}
