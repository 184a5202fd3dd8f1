//! Immutable, versioned retrieval index snapshots.
//!
//! An [`IndexSnapshot`] is built once by a [`SnapshotBuilder`] and never
//! mutated afterwards: all fields are private and exposed through
//! read-only accessors. An incremental update starts a builder from the
//! previous snapshot with [`SnapshotBuilder::from_snapshot`], which shares
//! the already-embedded chunks through `Arc` instead of copying vectors.
//!
//! Version numbers are assigned by whoever publishes snapshots; this module
//! only stores them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Chunk, Document};

/// Index-side record of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub id: String,
    pub title: String,
    pub content_type: String,
    pub content_hash: String,
    pub loaded_at: DateTime<Utc>,
    pub chunk_count: usize,
}

impl DocumentEntry {
    pub fn from_document(doc: &Document, chunk_count: usize) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            content_type: doc.content_type.clone(),
            content_hash: doc.content_hash.clone(),
            loaded_at: doc.loaded_at,
            chunk_count,
        }
    }
}

/// A chunk together with its embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// An immutable retrieval index built from a fixed document set.
#[derive(Debug)]
pub struct IndexSnapshot {
    version: u64,
    created_at: DateTime<Utc>,
    embedding_model: String,
    documents: BTreeMap<String, DocumentEntry>,
    chunks: Vec<Arc<IndexedChunk>>,
}

impl IndexSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Model that produced every vector in this snapshot.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.documents.values()
    }

    pub fn document(&self, id: &str) -> Option<&DocumentEntry> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Chunks ordered by `(document_id, chunk_index)`.
    pub fn chunks(&self) -> &[Arc<IndexedChunk>] {
        &self.chunks
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Serializable overview without chunk text or vectors.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            version: self.version,
            created_at: self.created_at,
            embedding_model: self.embedding_model.clone(),
            document_count: self.documents.len(),
            chunk_count: self.chunks.len(),
            documents: self.documents.values().cloned().collect(),
        }
    }
}

/// Serializable description of a snapshot, without vectors.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub embedding_model: String,
    pub document_count: usize,
    pub chunk_count: usize,
    pub documents: Vec<DocumentEntry>,
}

/// Accumulates documents and embedded chunks into a new [`IndexSnapshot`].
#[derive(Debug)]
pub struct SnapshotBuilder {
    embedding_model: String,
    documents: BTreeMap<String, DocumentEntry>,
    chunks: BTreeMap<String, Vec<Arc<IndexedChunk>>>,
}

impl SnapshotBuilder {
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            documents: BTreeMap::new(),
            chunks: BTreeMap::new(),
        }
    }

    /// Start from the contents of `snapshot`, sharing its chunks.
    pub fn from_snapshot(snapshot: &IndexSnapshot) -> Self {
        let mut chunks: BTreeMap<String, Vec<Arc<IndexedChunk>>> = BTreeMap::new();
        for c in &snapshot.chunks {
            chunks
                .entry(c.chunk.document_id.clone())
                .or_default()
                .push(Arc::clone(c));
        }
        Self {
            embedding_model: snapshot.embedding_model.clone(),
            documents: snapshot.documents.clone(),
            chunks,
        }
    }

    /// Add a document, replacing any previous entry and chunks with the same id.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(
        &mut self,
        entry: DocumentEntry,
        chunks: Vec<IndexedChunk>,
    ) -> Option<DocumentEntry> {
        let id = entry.id.clone();
        let mut chunks: Vec<Arc<IndexedChunk>> = chunks.into_iter().map(Arc::new).collect();
        chunks.sort_by_key(|c| c.chunk.chunk_index);
        self.chunks.insert(id.clone(), chunks);
        self.documents.insert(id, entry)
    }

    /// Drop a document and its chunks. Returns the removed entry, if any.
    pub fn remove(&mut self, id: &str) -> Option<DocumentEntry> {
        self.chunks.remove(id);
        self.documents.remove(id)
    }

    /// Freeze the builder into a snapshot. Chunks end up ordered by
    /// document id, then chunk index.
    pub fn build(self, version: u64, created_at: DateTime<Utc>) -> IndexSnapshot {
        let chunks = self.chunks.into_values().flatten().collect();
        IndexSnapshot {
            version,
            created_at,
            embedding_model: self.embedding_model,
            documents: self.documents,
            chunks,
        }
    }
}
