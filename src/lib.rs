#![deny(missing_docs)]

//! Core library for the gemdrive question-answering service.

/// HTTP routing, REST handlers, and the embedded browser UI.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Google Drive folder listing and text extraction.
pub mod drive;
/// Gemini completion client and model negotiation.
pub mod gemini;
/// Structured logging and tracing setup.
pub mod logging;
/// Chunking, ranking, context assembly, and the pipeline facade.
pub mod retrieval;
