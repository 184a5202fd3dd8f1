//! Passage retrieval over an [`IndexSnapshot`].
//!
//! The caller embeds the question; this module does the scoring.
//!
//! # Algorithm
//!
//! 1. Score every chunk by cosine similarity to the question vector.
//! 2. Drop chunks below `relevance_threshold`. If nothing survives, the
//!    snapshot holds no relevant content and the result is empty.
//! 3. Score survivors by keyword overlap (fraction of distinct question
//!    terms present in the chunk).
//! 4. Min-max normalize both score sets to `[0, 1]` among survivors.
//! 5. Merge: `score = (1 - α) × keyword + α × semantic`.
//! 6. Sort by score (desc), then document id and chunk index (asc).
//! 7. Truncate to `top_k`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::embedding::cosine_similarity;
use crate::snapshot::{IndexSnapshot, IndexedChunk};

/// Snippet length, in characters, for passages shown to users.
const SNIPPET_CHARS: usize = 240;

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Maximum passages to return.
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to count as relevant.
    pub relevance_threshold: f32,
    /// Weight for semantic vs keyword: `(1-α)*keyword + α*semantic`.
    pub hybrid_alpha: f64,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 4,
            relevance_threshold: 0.2,
            hybrid_alpha: 0.7,
        }
    }
}

/// A retrieved chunk with its scores.
#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub document_id: String,
    pub chunk_id: String,
    pub chunk_index: i64,
    pub text: String,
    /// Raw cosine similarity to the question.
    pub similarity: f32,
    /// Normalized keyword score among survivors.
    pub keyword_score: f64,
    /// Final hybrid score in `[0, 1]`.
    pub score: f64,
}

impl Passage {
    /// The first [`SNIPPET_CHARS`] characters of the passage text.
    pub fn snippet(&self) -> String {
        self.text.chars().take(SNIPPET_CHARS).collect()
    }
}

/// Retrieve the most relevant passages for `question` from `snapshot`.
///
/// An empty result means no chunk reached the relevance threshold.
pub fn retrieve(
    snapshot: &IndexSnapshot,
    question: &str,
    question_vec: &[f32],
    params: &RetrievalParams,
) -> Vec<Passage> {
    if question.trim().is_empty() || params.top_k == 0 {
        return Vec::new();
    }

    let survivors: Vec<(&IndexedChunk, f32)> = snapshot
        .chunks()
        .iter()
        .map(|c| (c.as_ref(), cosine_similarity(question_vec, &c.vector)))
        .filter(|(_, sim)| *sim >= params.relevance_threshold)
        .collect();
    if survivors.is_empty() {
        return Vec::new();
    }

    let terms = query_terms(question);
    let semantic: Vec<f64> = survivors.iter().map(|(_, s)| *s as f64).collect();
    let keyword: Vec<f64> = survivors
        .iter()
        .map(|(c, _)| keyword_overlap(&terms, &c.chunk.text))
        .collect();
    let norm_semantic = normalize_scores(&semantic);
    let norm_keyword = normalize_scores(&keyword);

    let alpha = params.hybrid_alpha.clamp(0.0, 1.0);
    let mut passages: Vec<Passage> = survivors
        .iter()
        .zip(norm_semantic.iter().zip(norm_keyword.iter()))
        .map(|((c, sim), (s, k))| Passage {
            document_id: c.chunk.document_id.clone(),
            chunk_id: c.chunk.id.clone(),
            chunk_index: c.chunk.chunk_index,
            text: c.chunk.text.clone(),
            similarity: *sim,
            keyword_score: *k,
            score: (1.0 - alpha) * k + alpha * s,
        })
        .collect();

    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.document_id.cmp(&b.document_id))
            .then(a.chunk_index.cmp(&b.chunk_index))
    });
    passages.truncate(params.top_k);
    passages
}

/// Lowercased alphanumeric terms of at least two characters.
fn query_terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of `terms` appearing (as substrings) in `text`.
fn keyword_overlap(terms: &BTreeSet<String>, text: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();
    let hits = terms.iter().filter(|t| lower.contains(t.as_str())).count();
    hits as f64 / terms.len() as f64
}

/// Min-max normalize scores to `[0.0, 1.0]`.
///
/// If all scores are equal they normalize to `1.0`.
pub fn normalize_scores(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let s_min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let s_max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = s_max - s_min;

    scores
        .iter()
        .map(|s| {
            if range.abs() < f64::EPSILON {
                1.0
            } else {
                (s - s_min) / range
            }
        })
        .collect()
}
