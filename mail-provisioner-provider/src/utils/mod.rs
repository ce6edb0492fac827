//! Utility modules.

/// Trimming and DKIM-key elision for log lines.
pub mod log_sanitizer;
