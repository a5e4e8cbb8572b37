//! Utility modules.

/// Serde helpers for int64 fields that the REST gateway encodes as strings.
pub mod int64;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
