/// Convenience result type used across the crate.
pub type ShowResult<T> = Result<T, ShowError>;

/// Top-level error taxonomy used by loader, validator and player APIs.
#[derive(thiserror::Error, Debug)]
pub enum ShowError {
    /// Malformed or missing fields, wrong versions, oversized drone arrays.
    #[error("schema error: {0}")]
    Schema(String),

    /// A trajectory segment with more Bezier control points than supported.
    #[error("unsupported segment: {0}")]
    UnsupportedSegment(String),

    /// Light program bytecode that cannot be executed.
    #[error("bytecode error: {0}")]
    Bytecode(#[from] BytecodeError),

    /// Timestamp outside the domain a player accepts.
    #[error("domain error: {0}")]
    Domain(String),

    /// A `$ref` pointer using a scheme other than `zip:`.
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowError {
    /// Build a [`ShowError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`ShowError::UnsupportedSegment`] value.
    pub fn unsupported_segment(msg: impl Into<String>) -> Self {
        Self::UnsupportedSegment(msg.into())
    }

    /// Build a [`ShowError::Domain`] value.
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Build a [`ShowError::UnsupportedProtocol`] value.
    pub fn unsupported_protocol(msg: impl Into<String>) -> Self {
        Self::UnsupportedProtocol(msg.into())
    }

    /// Build a [`ShowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failures raised by the light program interpreter.
///
/// Offsets are byte positions into the bytecode where the failing command or
/// operand starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BytecodeError {
    /// Opcode byte not present in the command table.
    #[error("unknown command {code} at offset {offset}")]
    UnknownCommand {
        /// Offending opcode.
        code: u8,
        /// Offset of the opcode.
        offset: usize,
    },

    /// `LOOP_END` executed with no open loop.
    #[error("loop end without matching loop begin at offset {offset}")]
    EmptyLoopStack {
        /// Offset of the `LOOP_END` opcode.
        offset: usize,
    },

    /// Variable-length integer longer than ten bytes.
    #[error("varuint at offset {offset} does not fit in 64 bits")]
    VarintOverflow {
        /// Offset of the first byte of the integer.
        offset: usize,
    },

    /// Bytecode ended while decoding an operand.
    #[error("bytecode truncated at offset {offset}")]
    Truncated {
        /// Offset where more bytes were expected.
        offset: usize,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
