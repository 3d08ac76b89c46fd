use std::{sync::Arc, time::Duration};

use analysis_store::AnalysisStore;
use blob_store::BlobStore;
use data_model::{AnalysisRecord, BlobId, TextStatistics};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::{text_stats, wordcloud::WordCloudClient};

/// What one analyze call produced. `word_cloud_ref` is `None` both for a
/// missing source and for a failed render; only the cache distinguishes the
/// two.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub statistics: TextStatistics,
    pub word_cloud_ref: Option<BlobId>,
}

impl AnalysisOutcome {
    fn empty() -> Self {
        Self {
            statistics: TextStatistics::default(),
            word_cloud_ref: None,
        }
    }
}

impl From<AnalysisRecord> for AnalysisOutcome {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            statistics: record.statistics(),
            word_cloud_ref: record.word_cloud_ref,
        }
    }
}

/// Runs the analysis pipeline: cache lookup, source fetch, statistics,
/// render, image persistence, cache write.
///
/// A cache entry is written only for a fully completed analysis (or for a
/// legitimately empty document), so every cached record is a complete result
/// and a failed analysis can simply be retried.
pub struct Analyzer {
    blob_store: Arc<BlobStore>,
    analysis_store: Arc<AnalysisStore>,
    word_cloud: Arc<WordCloudClient>,
    storage_timeout: Duration,
}

impl Analyzer {
    pub fn new(
        blob_store: Arc<BlobStore>,
        analysis_store: Arc<AnalysisStore>,
        word_cloud: Arc<WordCloudClient>,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            blob_store,
            analysis_store,
            word_cloud,
            storage_timeout,
        }
    }

    pub async fn analyze(&self, document_id: &str) -> AnalysisOutcome {
        if let Some(record) = self.analysis_store.get(document_id) {
            info!("returning cached analysis for document {}", document_id);
            self.analysis_store.touch(document_id);
            return record.into();
        }

        let source = match timeout(
            self.storage_timeout,
            self.blob_store.read_bytes(&BlobId::from(document_id)),
        )
        .await
        {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                warn!("document {} not found, nothing to analyze", document_id);
                return AnalysisOutcome::empty();
            }
            Ok(Err(e)) => {
                warn!("failed to read document {}: {}", document_id, e);
                return AnalysisOutcome::empty();
            }
            Err(_) => {
                warn!("timed out reading document {}", document_id);
                return AnalysisOutcome::empty();
            }
        };

        let text = String::from_utf8_lossy(&source);
        if text.trim().is_empty() {
            info!("document {} is empty, caching zero statistics", document_id);
            let record = AnalysisRecord::new(document_id, TextStatistics::default(), None);
            self.analysis_store.put(record.clone());
            return record.into();
        }

        let statistics = text_stats::analyze(&text);

        let image = match self.word_cloud.render(&text).await {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    "word cloud rendering failed for document {}: {}",
                    document_id, e
                );
                return AnalysisOutcome {
                    statistics,
                    word_cloud_ref: None,
                };
            }
        };

        let cloud_name = format!("wordcloud_{}.png", document_id);
        let cloud_blob = match timeout(
            self.storage_timeout,
            self.blob_store.put(image, &cloud_name, "image/png"),
        )
        .await
        {
            Ok(Ok(blob)) => blob,
            Ok(Err(e)) => {
                warn!(
                    "failed to store word cloud for document {}: {}",
                    document_id, e
                );
                return AnalysisOutcome {
                    statistics,
                    word_cloud_ref: None,
                };
            }
            Err(_) => {
                warn!("timed out storing word cloud for document {}", document_id);
                return AnalysisOutcome {
                    statistics,
                    word_cloud_ref: None,
                };
            }
        };

        let record = AnalysisRecord::new(document_id, statistics, Some(cloud_blob.id));
        self.analysis_store.put(record.clone());
        info!("stored analysis result for document {}", document_id);
        record.into()
    }
}
