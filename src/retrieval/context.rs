//! Context assembly with source labels and a character budget.

use super::types::{Document, ScoredChunk};

/// Marker appended whenever the context is cut at the character budget.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Concatenate ranked windows into a prompt-ready context string.
///
/// Each window becomes a block labelled with its source file, and blocks are
/// separated by a blank line. Order is the ranker's order.
pub fn assemble_chunks(selected: &[ScoredChunk<'_>]) -> String {
    let blocks: Vec<String> = selected
        .iter()
        .map(|candidate| {
            format!(
                "--- From file: {} ---\n{}\n",
                candidate.chunk.file, candidate.chunk.text
            )
        })
        .collect();
    blocks.join("\n")
}

/// Fallback used when ranking produced nothing: concatenate every document in
/// full, then cut to the budget.
///
/// Small corpora with no keyword overlap still get some context this way
/// rather than none.
pub fn assemble_all_documents(documents: &[Document], max_chars: usize) -> String {
    let blocks: Vec<String> = documents
        .iter()
        .map(|document| format!("--- File: {} ---\n{}\n", document.name, document.text))
        .collect();
    truncate_to_budget(blocks.join("\n"), max_chars)
}

/// Cut the context to at most `max_chars` characters, appending the marker
/// when a cut happened.
///
/// Counts characters, not bytes, so the cut never lands inside a code point.
/// Applying this twice with the same budget leaves the string unchanged, which
/// lets the completion boundary re-apply it as a final guard.
pub fn truncate_to_budget(context: String, max_chars: usize) -> String {
    match context.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => {
            let mut truncated = context;
            truncated.truncate(byte_offset);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => context,
    }
}
