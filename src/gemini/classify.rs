//! Best-effort classification of Gemini failure text.
//!
//! The backend surfaces failures as free-form text (status line plus body, or
//! a transport error). Classification is an ordered rule list over that text,
//! versioned against Gemini's current error vocabulary; each rule is pinned by
//! a unit test with a literal sample. Classification only shapes the message
//! shown to the caller, nothing here retries.

use thiserror::Error;

/// Substrings that mark a premium model tier inside a quota failure.
const PREMIUM_MODEL_MARKERS: [&str; 2] = ["gemini-2.5-pro", "gemini-2.0"];

/// Longest failure detail echoed back to the caller.
const DETAIL_LIMIT: usize = 300;

/// Errors returned while interacting with Gemini.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Gemini URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API key ran into quota or rate limits; retry later.
    #[error("Rate limit exceeded. Please wait a moment and try again. Details: {detail}")]
    RateLimited {
        /// Truncated failure text from the backend.
        detail: String,
    },
    /// The configured model is gated behind a paid plan.
    #[error(
        "The configured model requires a paid API plan. Set GEMINI_MODEL to a free-tier model such as 'gemini-flash-latest' or 'gemini-pro-latest'."
    )]
    PaidTierRequired,
    /// The configured model name is unknown to the backend.
    #[error(
        "Model not found. Set GEMINI_MODEL to a free-tier model such as 'gemini-flash-latest' or 'gemini-pro-latest'."
    )]
    ModelNotFound,
    /// Any other backend failure, carrying the original text.
    #[error("Gemini request failed: {0}")]
    Backend(String),
    /// No candidate or backend-listed model could be initialized.
    #[error(
        "Could not initialize any Gemini model: {detail}. Run the check-models binary to see the models available to this API key."
    )]
    NoUsableModel {
        /// What went wrong with the last attempt.
        detail: String,
    },
}

/// Sort raw failure text into the error taxonomy.
///
/// Rules are checked in order: quota/rate exhaustion first (split into
/// paid-tier when a premium model is named), then unknown model, then the
/// generic bucket. The quota rule matches `rate limit` as a phrase rather
/// than the bare word `rate`, which would otherwise fire on unrelated text.
pub fn classify_failure(raw: &str) -> CompletionError {
    let lowered = raw.to_lowercase();

    let quota_related = raw.contains("429")
        || lowered.contains("quota")
        || lowered.contains("rate limit")
        || lowered.contains("resource_exhausted");
    if quota_related {
        if PREMIUM_MODEL_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return CompletionError::PaidTierRequired;
        }
        return CompletionError::RateLimited {
            detail: truncate_detail(raw),
        };
    }

    if raw.contains("404") && lowered.contains("not found") {
        return CompletionError::ModelNotFound;
    }

    CompletionError::Backend(raw.to_string())
}

fn truncate_detail(raw: &str) -> String {
    match raw.char_indices().nth(DETAIL_LIMIT) {
        Some((offset, _)) => raw[..offset].to_string(),
        None => raw.to_string(),
    }
}
