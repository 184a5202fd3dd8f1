//! Core data models: loaded documents and their chunks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// A document loaded from the content directory.
///
/// Immutable once loaded. A changed file produces a new `Document` with the
/// same `id` and a different `content_hash`, which supersedes the old one
/// in the next index update.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Path relative to the content directory, `/`-separated.
    pub id: String,
    /// Display title (the file name).
    pub title: String,
    /// Extracted plain text.
    pub body: String,
    /// MIME type the body was extracted from.
    pub content_type: String,
    /// SHA-256 of the extracted body.
    pub content_hash: String,
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    /// Builds a document, computing its content hash from `body`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let body = body.into();
        Self {
            id: id.into(),
            title: title.into(),
            content_hash: sha256_hex(&body),
            body,
            content_type: content_type.into(),
            loaded_at: Utc::now(),
        }
    }
}

/// A chunk of a document's body text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

/// Lowercase hex SHA-256 digest of `text`.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_tracks_body() {
        let a = Document::new("a.txt", "a.txt", "same body", "text/plain");
        let b = Document::new("b.txt", "b.txt", "same body", "text/plain");
        let c = Document::new("a.txt", "a.txt", "other body", "text/plain");
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
        assert_eq!(a.content_hash.len(), 64);
    }
}
