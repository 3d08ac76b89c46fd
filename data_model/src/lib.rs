use std::fmt::{self, Display};

use papyrine_utils::get_epoch_time_in_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored blob. Assigned once at creation and never reused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobId(String);

impl BlobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An immutable, content-addressed byte sequence with its metadata.
/// `content_hash` is unique across all blobs; uploads with identical bytes
/// resolve to the same blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    pub id: BlobId,
    pub content_hash: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub storage_path: String,
    pub uploaded_at: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextStatistics {
    pub paragraph_count: u32,
    pub word_count: u32,
    pub character_count: u32,
}

impl TextStatistics {
    pub fn new(paragraph_count: u32, word_count: u32, character_count: u32) -> Self {
        Self {
            paragraph_count,
            word_count,
            character_count,
        }
    }
}

/// Cached result of analyzing one document. At most one record exists per
/// `document_id`, and a record is only ever written for a fully completed
/// analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub document_id: String,
    pub paragraph_count: u32,
    pub word_count: u32,
    pub character_count: u32,
    pub word_cloud_ref: Option<BlobId>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl AnalysisRecord {
    pub fn new(document_id: &str, statistics: TextStatistics, word_cloud_ref: Option<BlobId>) -> Self {
        let now = get_epoch_time_in_ms();
        Self {
            document_id: document_id.to_string(),
            paragraph_count: statistics.paragraph_count,
            word_count: statistics.word_count,
            character_count: statistics.character_count,
            word_cloud_ref,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn statistics(&self) -> TextStatistics {
        TextStatistics::new(self.paragraph_count, self.word_count, self.character_count)
    }

    pub fn touch(&mut self) {
        self.updated_at = get_epoch_time_in_ms();
    }
}
