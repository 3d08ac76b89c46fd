use dashmap::DashMap;
use data_model::AnalysisRecord;

/// Concurrent table of analysis results, keyed by document id.
///
/// `put` is a last-write-wins upsert; callers enforce the write-once policy.
#[derive(Default)]
pub struct AnalysisStore {
    records: DashMap<String, AnalysisRecord>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn get(&self, document_id: &str) -> Option<AnalysisRecord> {
        self.records
            .get(document_id)
            .map(|record| record.value().clone())
    }

    pub fn put(&self, record: AnalysisRecord) {
        self.records.insert(record.document_id.clone(), record);
    }

    /// Refreshes `updated_at` on an existing record without altering its
    /// payload. No-op for unknown document ids.
    pub fn touch(&self, document_id: &str) {
        if let Some(mut record) = self.records.get_mut(document_id) {
            record.touch();
        }
    }
}
