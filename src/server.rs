use std::sync::Arc;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use dashstate::api::{self, AppState};
use dashstate::config::Config;
use dashstate::dashboard::{Collector, Dispatcher, EventKind, Sources};
use dashstate::observability::Metrics;
use dashstate::store::DataStore;
use dashstate::transport::{HttpTransport, MemoryTransport, Transport, TransportError};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run the dispatcher and the HTTP API until Ctrl+C or SIGTERM.
pub async fn run(config: Config, address: Option<SocketAddr>) -> Result<(), AnyError> {
    let store = DataStore::new();
    let metrics = Arc::new(Metrics::new());

    let sources = Sources::from_config(&config.apps, config.dashboard.timeout())?;
    let instances = sources.enabled();
    info!(instances, "dashboard sources configured");

    let transport = match http_transport(&config) {
        Ok(transport) => transport,
        Err(TransportError::NotConfigured) => {
            warn!("transport.base_url not set, snapshots are kept locally");
            Arc::new(MemoryTransport::new())
        }
        Err(e) => return Err(e.into()),
    };

    let (dispatcher, trigger) = Dispatcher::new(
        Collector::new(sources, store.clone()),
        transport,
        store.clone(),
        Arc::clone(&metrics),
        config.dashboard.interval(),
    );
    let phase = dispatcher.phase();

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let dispatcher_task = tokio::spawn(dispatcher.run(async move {
        let _ = stop_rx.wait_for(|stop| *stop).await;
    }));

    let state = AppState::new(store, trigger, metrics, phase, instances);
    let address = address.unwrap_or(config.server.bind_addr);
    let served = api::run(address, state, shutdown_signal()).await;

    let _ = stop_tx.send(true);
    dispatcher_task.await?;
    served
}

/// Run a single cycle and print the snapshot.
pub async fn once(config: Config, send: bool) -> Result<(), AnyError> {
    let store = DataStore::new();
    let sources = Sources::from_config(&config.apps, config.dashboard.timeout())?;
    let collector = Collector::new(sources, store.clone());

    let snapshot = if send {
        let (dispatcher, _trigger) = Dispatcher::new(
            collector,
            http_transport(&config)?,
            store,
            Arc::new(Metrics::new()),
            Duration::ZERO,
        );
        dispatcher.cycle(EventKind::User).await
    } else {
        collector.collect().await
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn http_transport(config: &Config) -> Result<Arc<dyn Transport>, TransportError> {
    let transport = HttpTransport::new(
        &config.transport.base_url,
        config.transport.api_key.clone(),
        config.transport.timeout(),
    )?;
    Ok(Arc::new(transport))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
