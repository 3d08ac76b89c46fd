#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use anyhow::Result;
    use bytes::Bytes;
    use data_model::BlobId;

    use crate::testing::{TestService, WordCloudStub, FAKE_PNG};

    const ABOBA: &str = "This is aboba content.";

    async fn store_document(test_srv: &TestService, content: &str) -> Result<String> {
        let blob = test_srv
            .service
            .blob_store
            .put(Bytes::from(content.to_string()), "document.txt", "text/plain")
            .await?;
        Ok(blob.id.to_string())
    }

    #[tokio::test]
    async fn analyze_computes_statistics_and_stores_the_cloud() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::Png).await?;
        let document_id = store_document(&test_srv, ABOBA).await?;

        let outcome = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(outcome.statistics.paragraph_count, 1);
        assert_eq!(outcome.statistics.word_count, 4);
        assert_eq!(outcome.statistics.character_count, 22);

        let cloud_ref = outcome.word_cloud_ref.expect("word cloud should be stored");
        let image = test_srv
            .service
            .blob_store
            .read_bytes(&cloud_ref)
            .await?
            .expect("cloud blob should be readable");
        assert_eq!(image, Bytes::from(FAKE_PNG));

        let cloud_blob = test_srv.service.blob_store.metadata(&cloud_ref).unwrap();
        assert_eq!(cloud_blob.mime_type, "image/png");
        assert_eq!(
            cloud_blob.display_name,
            format!("wordcloud_{}.png", document_id)
        );

        let record = test_srv
            .service
            .analysis_store
            .get(&document_id)
            .expect("completed analysis should be cached");
        assert_eq!(record.word_count, 4);
        assert_eq!(record.word_cloud_ref, Some(cloud_ref));
        Ok(())
    }

    #[tokio::test]
    async fn cache_hit_skips_recomputation_and_refreshes_updated_at() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::Png).await?;
        let document_id = store_document(&test_srv, ABOBA).await?;

        let first = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(test_srv.word_cloud_calls.load(Ordering::SeqCst), 1);
        let first_record = test_srv.service.analysis_store.get(&document_id).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(second.statistics, first.statistics);
        assert_eq!(second.word_cloud_ref, first.word_cloud_ref);
        // cached, the renderer is not consulted again
        assert_eq!(test_srv.word_cloud_calls.load(Ordering::SeqCst), 1);

        let second_record = test_srv.service.analysis_store.get(&document_id).unwrap();
        assert_eq!(second_record.created_at, first_record.created_at);
        assert!(second_record.updated_at > first_record.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn missing_document_yields_zero_statistics_and_no_cache_entry() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::Png).await?;

        let document_id = BlobId::new().to_string();
        let outcome = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(outcome.statistics.paragraph_count, 0);
        assert_eq!(outcome.statistics.word_count, 0);
        assert_eq!(outcome.statistics.character_count, 0);
        assert!(outcome.word_cloud_ref.is_none());

        assert!(test_srv.service.analysis_store.get(&document_id).is_none());
        assert_eq!(test_srv.word_cloud_calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_document_caches_zero_statistics() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::Png).await?;
        let document_id = store_document(&test_srv, "   \n\t \n  ").await?;

        let outcome = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(outcome.statistics.word_count, 0);
        assert!(outcome.word_cloud_ref.is_none());

        // unlike a missing document, an empty one is a complete result
        let record = test_srv
            .service
            .analysis_store
            .get(&document_id)
            .expect("empty document should be cached");
        assert_eq!(record.character_count, 0);
        assert!(record.word_cloud_ref.is_none());
        assert_eq!(test_srv.word_cloud_calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn render_failure_returns_statistics_without_caching() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::ServerError).await?;
        let document_id = store_document(&test_srv, ABOBA).await?;

        let outcome = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(outcome.statistics.paragraph_count, 1);
        assert_eq!(outcome.statistics.word_count, 4);
        assert_eq!(outcome.statistics.character_count, 22);
        assert!(outcome.word_cloud_ref.is_none());
        assert!(test_srv.service.analysis_store.get(&document_id).is_none());

        // a retry redoes the whole pipeline, render included
        let retry = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(retry.statistics, outcome.statistics);
        assert_eq!(test_srv.word_cloud_calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn empty_render_body_counts_as_failure() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::EmptyBody).await?;
        let document_id = store_document(&test_srv, ABOBA).await?;

        let outcome = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(outcome.statistics.word_count, 4);
        assert!(outcome.word_cloud_ref.is_none());
        assert!(test_srv.service.analysis_store.get(&document_id).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn identical_clouds_dedupe_across_documents() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::Png).await?;
        let first_doc = store_document(&test_srv, "Alpha beta.").await?;
        let second_doc = store_document(&test_srv, "Gamma delta.").await?;
        assert_ne!(first_doc, second_doc);

        let first = test_srv.service.analyzer.analyze(&first_doc).await;
        let second = test_srv.service.analyzer.analyze(&second_doc).await;

        // the stub renders identical bytes for both, so the cloud blobs
        // collapse into one through the same content-addressed store
        assert_eq!(first.word_cloud_ref, second.word_cloud_ref);
        assert!(first.word_cloud_ref.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn multi_paragraph_document_statistics() -> Result<()> {
        let test_srv = TestService::new(WordCloudStub::Png).await?;
        let document_id = store_document(&test_srv, "A.\n\nB.").await?;

        let outcome = test_srv.service.analyzer.analyze(&document_id).await;
        assert_eq!(outcome.statistics.paragraph_count, 2);
        assert_eq!(outcome.statistics.word_count, 2);
        assert_eq!(outcome.statistics.character_count, 6);
        Ok(())
    }
}
