//! Model candidate ordering and fallback selection.

/// Known free-tier fallbacks tried after the configured model, newest alias first.
pub const FALLBACK_MODELS: [&str; 7] = [
    "gemini-flash-latest",
    "gemini-pro-latest",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro-latest",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// Free-tier identifiers recommended in configuration errors and diagnostics.
pub const FREE_TIER_MODELS: [&str; 2] = ["gemini-flash-latest", "gemini-pro-latest"];

/// Ordered candidate list: the configured model first, then the known
/// fallbacks, with duplicates removed.
pub fn model_candidates(configured: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(FALLBACK_MODELS.len() + 1);
    for name in std::iter::once(configured).chain(FALLBACK_MODELS.iter().copied()) {
        if !candidates.iter().any(|existing| existing == name) {
            candidates.push(name.to_string());
        }
    }
    candidates
}

/// Pick a model from a backend-supplied listing.
///
/// Prefers the first name suggesting a fast or general tier (`flash` or
/// `pro`), falling back to the first entry. Returns `None` for an empty
/// listing.
pub fn select_fallback_model(available: &[String]) -> Option<String> {
    available
        .iter()
        .find(|name| {
            let lowered = name.to_lowercase();
            lowered.contains("flash") || lowered.contains("pro")
        })
        .or_else(|| available.first())
        .cloned()
}
