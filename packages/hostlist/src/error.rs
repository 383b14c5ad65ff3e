use thiserror::Error;

/// Errors that can occur when processing host list strings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A range item inside brackets did not match the expected format, described its numbers in
    /// the wrong order or used a box coordinate of the wrong length.
    #[error("invalid host range: '{invalid_value}' is invalid: {problem}")]
    InvalidRange {
        /// The specific value that was invalid. This may either be an entire token
        /// or a single range item inside it, depending on the problem.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// A token had unterminated, nested or too many bracket groups.
    #[error("invalid brackets: '{invalid_value}' is invalid: {problem}")]
    InvalidBrackets {
        /// The token that contained the bad bracket group.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// A range item, bracket group or prefix expansion exceeded one of the configured caps.
    #[error("'{invalid_value}' expands to {count} items, which exceeds the limit of {limit}")]
    RangeTooLarge {
        /// The range item or token that was too large.
        invalid_value: String,

        /// How many items the value would have expanded to, as far as it was counted.
        count: u64,

        /// The configured limit that was exceeded.
        limit: u64,
    },

    /// A number in a range item does not fit in 64 bits.
    #[error("'{invalid_value}' does not fit in a 64-bit host number")]
    NumberTooLarge {
        /// The digits that did not fit.
        invalid_value: String,
    },

    /// A host name produced by expansion is longer than the configured maximum.
    #[error("host name '{invalid_value}' is longer than the limit of {limit} bytes")]
    HostnameTooLong {
        /// The host name that was too long.
        invalid_value: String,

        /// The configured limit in bytes.
        limit: usize,
    },

    /// The caller-provided buffer was too small for the rendered host list. The buffer holds
    /// a NUL-terminated prefix of the full string.
    #[error("rendered host list needs {required} bytes but the buffer only has {available}")]
    Truncated {
        /// Bytes needed for the full string, including the NUL terminator.
        required: usize,

        /// Bytes available in the buffer.
        available: usize,
    },
}

impl Error {
    pub(crate) fn invalid_range(invalid_value: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::InvalidRange {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
        }
    }

    pub(crate) fn invalid_brackets(
        invalid_value: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        Self::InvalidBrackets {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
        }
    }

    pub(crate) fn too_large(invalid_value: impl Into<String>, count: u64, limit: u64) -> Self {
        Self::RangeTooLarge {
            invalid_value: invalid_value.into(),
            count,
            limit,
        }
    }
}

/// A specialized `Result` type for host list operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
