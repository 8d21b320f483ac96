//! Lexical relevance scoring and top-K selection.
//!
//! Scoring is deliberately a naive baseline: the fraction of distinct query
//! tokens that appear anywhere in the window. The pipeline depends only on the
//! `(query, chunks, top_k) -> ordered subset` contract, so an embedding-based
//! ranker could slot in behind the same signature.

use std::collections::HashSet;

use super::types::{Chunk, ScoredChunk};

/// Score every window against the query and keep the best `top_k`.
///
/// Windows sharing no token with the query are dropped entirely; when nothing
/// survives, the caller falls back to whole-document context. Ties keep the
/// original window order (document order, then offset), and a `top_k` beyond
/// the number of survivors returns all of them.
pub fn rank_chunks<'a>(query: &str, chunks: &'a [Chunk], top_k: usize) -> Vec<ScoredChunk<'a>> {
    let query_tokens = tokenize(query);

    let mut scored: Vec<ScoredChunk<'a>> = chunks
        .iter()
        .map(|chunk| ScoredChunk {
            chunk,
            score: score_chunk(&query_tokens, chunk),
        })
        .filter(|candidate| candidate.score > 0.0)
        .collect();

    // Vec::sort_by is stable, which is what keeps equal scores in corpus order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    scored
}

/// Fraction of distinct query tokens present in the window, in `[0, 1]`.
///
/// Repeated tokens carry no extra weight and window length is not penalized: a
/// window holding every query token scores 1.0 no matter how much unrelated
/// text surrounds them.
fn score_chunk(query_tokens: &HashSet<String>, chunk: &Chunk) -> f64 {
    let chunk_tokens = tokenize(&chunk.text);
    let shared = query_tokens.intersection(&chunk_tokens).count();
    shared as f64 / query_tokens.len().max(1) as f64
}

/// Lowercase and whitespace-split into a de-duplicated token set.
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}
