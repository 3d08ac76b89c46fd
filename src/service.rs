use std::{net::SocketAddr, sync::Arc, time::Duration};

use analysis_store::AnalysisStore;
use anyhow::{Context, Result};
use axum_server::Handle;
use blob_store::BlobStore;
use tokio::signal;
use tracing::info;

use crate::{
    analyzer::Analyzer,
    config::ServerConfig,
    routes::{create_routes, RouteState},
    wordcloud::WordCloudClient,
};

#[derive(Clone)]
#[allow(dead_code)]
pub struct Service {
    pub config: ServerConfig,
    pub blob_store: Arc<BlobStore>,
    pub analysis_store: Arc<AnalysisStore>,
    pub word_cloud: Arc<WordCloudClient>,
    pub analyzer: Arc<Analyzer>,
}

impl Service {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let blob_store = Arc::new(
            BlobStore::new(config.blob_storage.clone()).context("error initializing BlobStore")?,
        );
        let analysis_store = Arc::new(AnalysisStore::new());
        let word_cloud = Arc::new(
            WordCloudClient::new(config.word_cloud.clone())
                .context("error initializing WordCloudClient")?,
        );
        let analyzer = Arc::new(Analyzer::new(
            blob_store.clone(),
            analysis_store.clone(),
            word_cloud.clone(),
            Duration::from_secs(config.storage_timeout_secs),
        ));

        Ok(Self {
            config,
            blob_store,
            analysis_store,
            word_cloud,
            analyzer,
        })
    }

    pub async fn start(&self) -> Result<()> {
        let handle = Handle::new();
        let handle_sh = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let route_state = RouteState {
            blob_store: self.blob_store.clone(),
            analyzer: self.analyzer.clone(),
        };
        let addr: SocketAddr = self.config.listen_addr.parse()?;
        info!("server api listening on {}", self.config.listen_addr);
        let routes = create_routes(route_state);
        axum_server::bind(addr)
            .handle(handle)
            .serve(routes.into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
        },
        _ = terminate => {
        },
    }
    handle.shutdown();
    info!("signal received, shutting down server gracefully");
}
