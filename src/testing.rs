use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::Result;
use axum::{http::StatusCode, routing::post, Router};
use blob_store::BlobStoreConfig;
use tracing::subscriber;
use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::{config::ServerConfig, service::Service, wordcloud::WordCloudConfig};

/// Bytes the stub renderer hands back for a successful render.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake image bytes";

/// Canned behavior for the stub renderer endpoint.
#[derive(Clone, Copy)]
pub enum WordCloudStub {
    Png,
    ServerError,
    EmptyBody,
}

pub struct WordCloudStubServer {
    pub url: String,
    pub calls: Arc<AtomicUsize>,
}

/// Serves the word cloud API shape on an ephemeral port, counting calls.
pub async fn spawn_word_cloud_stub(stub: WordCloudStub) -> Result<WordCloudStubServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();
    let app = Router::new().route(
        "/wordcloud",
        post(move || {
            let calls = handler_calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                match stub {
                    WordCloudStub::Png => (StatusCode::OK, FAKE_PNG.to_vec()),
                    WordCloudStub::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, Vec::new()),
                    WordCloudStub::EmptyBody => (StatusCode::OK, Vec::new()),
                }
            }
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(WordCloudStubServer {
        url: format!("http://{}/wordcloud", addr),
        calls,
    })
}

pub struct TestService {
    pub service: Service,
    pub word_cloud_calls: Arc<AtomicUsize>,
    _temp_dir: tempfile::TempDir,
}

impl TestService {
    pub async fn new(stub: WordCloudStub) -> Result<Self> {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_filter(env_filter)),
        );

        let temp_dir = tempfile::tempdir()?;
        let renderer = spawn_word_cloud_stub(stub).await?;

        let config = ServerConfig {
            blob_storage: BlobStoreConfig::new(temp_dir.path().join("blobs").to_str().unwrap()),
            word_cloud: WordCloudConfig {
                url: renderer.url,
                timeout_secs: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let service = Service::new(config)?;

        Ok(Self {
            service,
            word_cloud_calls: renderer.calls,
            _temp_dir: temp_dir,
        })
    }
}
