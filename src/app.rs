use crate::config::Config;
use crate::registry::ModelRegistry;
use crate::restoration::RestorationService;
use crate::server::HttpServer;

use std::{error::Error, sync::Arc};
use tokio::{signal, sync::broadcast};

const DEFAULT_MODEL_ID: &str = "default";

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    ort::init().commit()?;

    let registry = Arc::new(ModelRegistry::new());
    let artifact_path = config.model.artifact_path();

    // Startup continues without a model; inference reports ModelNotLoaded
    // until a handle is registered.
    match registry.load(DEFAULT_MODEL_ID, &artifact_path, config.model.channel_order) {
        Ok(handle) => {
            tracing::info!(
                model = handle.id(),
                shape = ?handle.input_shape(),
                path = %artifact_path.display(),
                "model loaded"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %artifact_path.display(),
                "failed to load default model, starting in degraded mode"
            );
        }
    }

    let restoration_service = Arc::new(RestorationService::new(
        registry.clone(),
        &config.pipeline,
    ));

    let server = HttpServer::new(restoration_service, registry, &config).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let server_shutdown_rx = shutdown_tx.subscribe();

    let server_handle = server.run(server_shutdown_rx).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown.");

    let _ = shutdown_tx.send(());
    let _ = server_handle.await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
