//! Paragraph-boundary text chunker with optional overlap.
//!
//! Splits document text into [`Chunk`]s of at most `max_tokens` (estimated
//! at 4 characters per token). Paragraphs (`\n\n`-separated) are packed
//! together until the next one would not fit; a paragraph that is larger
//! than the limit on its own is hard-split at the last newline or space
//! before the limit.
//!
//! When `overlap_tokens > 0`, every chunk after the first is prefixed with
//! the tail of the previous chunk (starting at a word boundary), so a
//! sentence cut at a chunk edge is still retrievable from either side.
//!
//! Chunk ids are UUID v5 values derived from `(document_id, chunk_index)`,
//! so re-chunking the same document yields the same ids.
//!
//! # Example
//!
//! ```rust
//! use doc_interpreter_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("policy.txt", "Hello world.\n\nSecond paragraph.", 1000, 30);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_index, 0);
//! ```

use uuid::Uuid;

use crate::models::{sha256_hex, Chunk};

/// Approximate characters-per-token ratio.
const CHARS_PER_TOKEN: usize = 4;

/// Split `text` into chunks, respecting `max_tokens` and `overlap_tokens`.
///
/// # Guarantees
///
/// - At least one chunk is returned, even for empty text.
/// - Chunk indices are contiguous: `0, 1, …, N-1`.
/// - An overlap prefix never exceeds `overlap_tokens × 4` bytes.
pub fn chunk_text(
    document_id: &str,
    text: &str,
    max_tokens: usize,
    overlap_tokens: usize,
) -> Vec<Chunk> {
    let max_chars = (max_tokens * CHARS_PER_TOKEN).max(1);
    let overlap_chars = overlap_tokens * CHARS_PER_TOKEN;

    let pieces = split_pieces(text, max_chars);
    if pieces.is_empty() {
        return vec![make_chunk(document_id, 0, text.trim())];
    }

    let mut chunks = Vec::with_capacity(pieces.len());
    for (i, piece) in pieces.iter().enumerate() {
        let body = match i.checked_sub(1).map(|prev| &pieces[prev]) {
            Some(prev) if overlap_chars > 0 => {
                let tail = overlap_tail(prev, overlap_chars);
                if tail.is_empty() {
                    piece.clone()
                } else {
                    format!("{}\n{}", tail, piece)
                }
            }
            _ => piece.clone(),
        };
        chunks.push(make_chunk(document_id, i as i64, &body));
    }
    chunks
}

/// Pack paragraphs into pieces of at most `max_chars` bytes.
fn split_pieces(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut buf = String::new();

    for para in text.split("\n\n") {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }

        let would_be = if buf.is_empty() {
            trimmed.len()
        } else {
            buf.len() + 2 + trimmed.len()
        };
        if would_be > max_chars && !buf.is_empty() {
            pieces.push(std::mem::take(&mut buf));
        }

        if trimmed.len() > max_chars {
            hard_split(trimmed, max_chars, &mut pieces);
        } else {
            if !buf.is_empty() {
                buf.push_str("\n\n");
            }
            buf.push_str(trimmed);
        }
    }

    if !buf.is_empty() {
        pieces.push(buf);
    }
    pieces
}

/// Split an oversized paragraph at newline/space boundaries before `max_chars`.
fn hard_split(paragraph: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut remaining = paragraph;
    while !remaining.is_empty() {
        let limit = snap_to_char_boundary(remaining, remaining.len().min(max_chars));
        let split_at = if limit < remaining.len() {
            remaining[..limit]
                .rfind('\n')
                .or_else(|| remaining[..limit].rfind(' '))
                .map(|pos| pos + 1)
                .unwrap_or(limit)
        } else {
            limit
        };
        // A single char wider than the limit still has to make progress.
        let split_at = if split_at == 0 {
            remaining
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(remaining.len())
        } else {
            split_at
        };

        let piece = remaining[..split_at].trim();
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
        remaining = &remaining[split_at..];
    }
}

/// The last `overlap_chars` bytes of `text`, starting at a word boundary.
fn overlap_tail(text: &str, overlap_chars: usize) -> &str {
    if overlap_chars == 0 || text.is_empty() {
        return "";
    }
    let start = text.len().saturating_sub(overlap_chars);
    let mut start = start;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    let tail = &text[start..];
    if start == 0 {
        return tail.trim();
    }
    // Drop the partial word the byte cut landed in.
    match tail.find(char::is_whitespace) {
        Some(pos) => tail[pos..].trim(),
        None => "",
    }
}

/// Snap a byte index back to the nearest valid UTF-8 char boundary.
fn snap_to_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Deterministic chunk id for `(document_id, index)`.
pub fn chunk_id(document_id: &str, index: i64) -> String {
    let name = format!("{}#{}", document_id, index);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

fn make_chunk(document_id: &str, index: i64, text: &str) -> Chunk {
    Chunk {
        id: chunk_id(document_id, index),
        document_id: document_id.to_string(),
        chunk_index: index,
        text: text.to_string(),
        hash: sha256_hex(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("doc1", "Hello, world!", 1000, 30);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].text, "Hello, world!");
    }

    #[test]
    fn test_empty_text() {
        let chunks = chunk_text("doc1", "", 1000, 30);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert!(chunks[0].text.is_empty());
    }

    #[test]
    fn test_paragraphs_packed_under_limit() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_text("doc1", text, 1000, 0);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("First paragraph."));
        assert!(chunks[0].text.contains("Third paragraph."));
    }

    #[test]
    fn test_chunk_indices_contiguous() {
        let text = (0..50)
            .map(|i| format!("Paragraph number {}.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let chunks = chunk_text("doc1", &text, 10, 2);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i as i64, "Index mismatch at position {}", i);
        }
    }

    #[test]
    fn test_oversized_paragraph_hard_split() {
        let text = "word ".repeat(100);
        let chunks = chunk_text("doc1", &text, 5, 0);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.len() <= 20, "chunk too long: {:?}", c.text);
        }
    }

    #[test]
    fn test_overlap_carries_previous_tail() {
        let text = "alpha beta gamma delta\n\nepsilon zeta eta theta";
        let chunks = chunk_text("doc1", text, 6, 3);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].text.starts_with("gamma delta"));
        assert!(chunks[1].text.ends_with("epsilon zeta eta theta"));
    }

    #[test]
    fn test_zero_overlap_keeps_pieces_disjoint() {
        let text = "alpha beta gamma delta\n\nepsilon zeta eta theta";
        let chunks = chunk_text("doc1", text, 6, 0);
        assert_eq!(chunks[1].text, "epsilon zeta eta theta");
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────────────────┐\n│ Hello world      │\n└──────────────────┘";
        let chunks = chunk_text("doc1", text, 3, 1);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(!c.text.is_empty());
        }
    }

    #[test]
    fn test_ids_are_deterministic() {
        let text = "Alpha\n\nBeta\n\nGamma\n\nDelta";
        let c1 = chunk_text("doc1", text, 2, 0);
        let c2 = chunk_text("doc1", text, 2, 0);
        assert_eq!(c1, c2);
        assert_ne!(chunk_id("doc1", 0), chunk_id("doc2", 0));
    }
}
