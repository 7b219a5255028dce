//! Error and result types used across the crate.

/// Catch-all error type surfaced at the library boundary.
pub type Error = anyhow::Error;

/// Result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
