//! Library error taxonomy.
//!
//! Only conditions the caller must be able to report end up here. Everything
//! else (unparseable example text, arity mismatches, missing values) degrades
//! inside the parser/emitter per contract and never surfaces as an error.

/// Reportable failures at the crate boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller requested a profile with no registered emitter.
    #[error("unsupported profile: '{0}'")]
    UnsupportedProfile(String),

    /// Method metadata JSON could not be deserialized.
    /// The message carries the JSON path of the offending node.
    #[error("malformed method metadata: {0}")]
    Meta(String),

    /// Unexpected structural fault while assembling a harness.
    /// Carries the profile and the case being generated when it happened.
    #[error("codegen fault in profile '{profile}' at case {case_idx}: {message}")]
    Codegen {
        profile: &'static str,
        case_idx: usize,
        message: String,
    },
}
