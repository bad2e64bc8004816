//! Error types for the midigate processor.
//!
//! Only the configuration and precondition paths produce errors; a full
//! event queue is an expected-under-load condition handled by dropping the
//! event and counting it, never by an error on the real-time path.

use std::fmt;

use crate::params::ParameterId;

/// Errors that can occur in the midigate processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// Requested parameter id is unknown.
    InvalidParameter(ParameterId),
    /// Parameter value outside its documented range; no state was changed.
    ValueOutOfRange {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// The rejected value.
        value: u8,
        /// Inclusive lower bound.
        min: u8,
        /// Inclusive upper bound.
        max: u8,
    },
    /// Event delivered before the processor was initialized.
    Uninitialized,
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(id) => write!(f, "Invalid parameter id: {}", id),
            Self::ValueOutOfRange {
                parameter,
                value,
                min,
                max,
            } => write!(
                f,
                "Value {} out of range for parameter {} ({}..={})",
                value, parameter, min, max
            ),
            Self::Uninitialized => write!(f, "Processor not initialized"),
        }
    }
}

impl std::error::Error for GateError {}

/// Result type for midigate operations.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GateError::ValueOutOfRange {
            parameter: "Ch",
            value: 17,
            min: 1,
            max: 16,
        };
        assert_eq!(
            err.to_string(),
            "Value 17 out of range for parameter Ch (1..=16)"
        );
        assert_eq!(
            GateError::InvalidParameter(9).to_string(),
            "Invalid parameter id: 9"
        );
        assert_eq!(
            GateError::Uninitialized.to_string(),
            "Processor not initialized"
        );
    }
}
