//! The error taxonomy surfaced at the crate boundary (§6, §7).
use schema_frame::Pointer;

/// Errors produced by [`crate::compile`] or [`crate::Validator::evaluate`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed schema, invalid `$id`/`id`, or unrecognized base dialect. Wraps
    /// [`schema_frame::Error`] rather than duplicating its variants.
    #[error(transparent)]
    Schema(#[from] schema_frame::Error),
    /// The compiler's own invariants were violated: a keyword the configured
    /// [`schema_frame::SchemaWalker`] classified as an applicator has no registered handler,
    /// or a keyword value had the wrong JSON type.
    #[error("compile error at {pointer}: {message}")]
    Compile {
        /// The schema pointer where compilation failed.
        pointer: Pointer,
        /// Human-readable description.
        message: String,
    },
    /// `multipleOf`/`divisibleBy` was given a non-positive divisor.
    #[error("multipleOf must be a positive number at {0}")]
    InvalidMultipleOf(Pointer),
    /// A pattern (`pattern`, `patternProperties` key) is not a valid ECMAScript regex.
    #[error("invalid regular expression {pattern:?} at {pointer}")]
    InvalidPattern {
        /// The schema pointer the pattern was declared at.
        pointer: Pointer,
        /// The offending pattern source.
        pattern: String,
    },
    /// [`crate::Validator::evaluate`] exceeded the configured recursion limit while following
    /// `ControlJump` steps.
    #[error("recursion limit of {0} exceeded while evaluating")]
    RecursionLimitExceeded(usize),
    /// Evaluation was stopped cooperatively via a cancellation token.
    #[error("evaluation was cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn compile(pointer: Pointer, message: impl Into<String>) -> Self {
        Error::Compile {
            pointer,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the compiler and evaluator.
pub type Result<T> = std::result::Result<T, Error>;
