//! Fixed-size character windowing with positional metadata.
//!
//! Documents are cut independently, in input order, into windows of at most
//! `chunk_size` characters whose starts advance by `chunk_size - chunk_overlap`.
//! Offsets are Unicode-scalar counts, so slicing stays safe on multi-byte text.

use super::types::{Chunk, ChunkingError, Document};

/// Cut every document into overlapping windows.
///
/// Geometry is validated up front: a zero `chunk_size` or an `overlap` at or
/// above `chunk_size` is rejected rather than clamped, mirroring the check done
/// at configuration load. Window order is document order, then ascending start
/// offset; later stages rely on this order for tie-breaking.
pub fn chunk_documents(
    documents: &[Document],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge {
            chunk_size,
            overlap,
        });
    }

    let mut chunks = Vec::new();
    for document in documents {
        chunk_document(&document.name, &document.text, chunk_size, overlap, &mut chunks);
    }
    Ok(chunks)
}

/// Cut one document. Assumes `0 <= overlap < chunk_size`.
fn chunk_document(
    name: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
    chunks: &mut Vec<Chunk>,
) {
    let boundaries = char_boundaries(text);
    let char_len = boundaries.len() - 1;
    let step = chunk_size - overlap;

    let mut start = 0;
    while start < char_len {
        let end = (start + chunk_size).min(char_len);
        chunks.push(Chunk {
            file: name.to_string(),
            text: text[boundaries[start]..boundaries[end]].to_string(),
            start,
            end,
        });
        if end == char_len {
            break;
        }
        start += step;
    }
}

/// Byte offset of each character start, plus the total length as a sentinel.
fn char_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    boundaries.push(text.len());
    boundaries
}
