// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Typed errors for the pipeline, via thiserror.
//
// Two severities live in one enum:
//   - Per-example errors (UnknownCharacter, InsufficientPool,
//     MalformedRecord): the driver recovers locally by skipping
//     the example and counting the skip.
//   - Run-fatal errors (Io, ChecksumMismatch): surfaced
//     immediately through anyhow at the application boundary;
//     no partially written fold files are left behind.
//
// Reference: Rust Book §9 (Error Handling)

use thiserror::Error;

/// All failure modes of the dataset pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An example references a character the attribute store
    /// never loaded. Fatal to that single example only.
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    /// A raw input row is missing a required field.
    /// The record is skipped and the skip is counted.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// The candidate pool cannot supply enough distinct
    /// distractors for one example. Skipped and counted.
    #[error("insufficient pool: need {needed} distinct distractors, only {available} available")]
    InsufficientPool { needed: usize, available: usize },

    /// An input file's checksum does not match the expected
    /// value — the download is damaged. Fatal to the run.
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path:     String,
        expected: String,
        actual:   String,
    },

    /// Unreadable input or unwritable output. Fatal to the run.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for errors the driver recovers from by skipping the
    /// affected example; false for errors that abort the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownCharacter(_)
                | PipelineError::MalformedRecord { .. }
                | PipelineError::InsufficientPool { .. }
        )
    }
}

/// Result alias for pipeline-internal operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(PipelineError::UnknownCharacter("l999".into()).is_recoverable());
        assert!(PipelineError::InsufficientPool { needed: 5, available: 3 }.is_recoverable());
        assert!(
            PipelineError::MalformedRecord { line: 7, reason: "missing char_id".into() }
                .is_recoverable()
        );

        let io = PipelineError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_recoverable());
    }
}
