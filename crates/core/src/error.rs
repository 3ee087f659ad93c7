//! Error taxonomy for the lighting calculation core.
//!
//! Every failure is surfaced synchronously as a [`LightingError`]. Nothing is
//! retried and nothing is silently replaced by a default value: deciding to
//! fall back to a manually entered number belongs to the caller.

use thiserror::Error;

/// Errors produced by the photometric parser and the calculation engines.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LightingError {
    /// The photometric file lacks mandatory structure or carries
    /// unparsable numeric fields.
    #[error("Photometric format error: {context} (expected {expected}, found {found})")]
    Format {
        /// Which part of the file was being read
        context: &'static str,
        /// What the parser required at that point
        expected: String,
        /// What was actually present
        found: String,
    },

    /// An ordinal selection fell outside its fixed enumerated domain.
    #[error("Invalid {domain} selection {value}: valid range is 1..={max}")]
    InvalidSelection {
        /// Name of the enumerated set (e.g. `"maintenance category"`)
        domain: &'static str,
        /// The rejected ordinal
        value: i64,
        /// Largest valid ordinal
        max: u8,
    },

    /// A mathematical precondition was violated before computing.
    #[error("Domain error: {quantity} = {value} {requirement}")]
    Domain {
        /// Name of the offending quantity
        quantity: &'static str,
        /// The offending value
        value: f64,
        /// Human-readable constraint (e.g. `"must be greater than zero"`)
        requirement: &'static str,
    },
}

impl LightingError {
    /// Shorthand for a [`LightingError::Format`] error.
    pub fn format(
        context: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Format {
            context,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Shorthand for a [`LightingError::Domain`] error on a non-positive value.
    pub fn not_positive(quantity: &'static str, value: f64) -> Self {
        Self::Domain {
            quantity,
            value,
            requirement: "must be finite and greater than zero",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LightingError>;

/// Reject values that are not finite and strictly positive.
pub(crate) fn ensure_positive(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LightingError::not_positive(quantity, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message_carries_context() {
        let err = LightingError::format("tilt marker", "a line starting with TILT=", "end of file");
        let msg = err.to_string();
        assert!(msg.contains("tilt marker"));
        assert!(msg.contains("TILT="));
        assert!(msg.contains("end of file"));
    }

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("area", 16.0), Ok(16.0));
        assert!(ensure_positive("area", 0.0).is_err());
        assert!(ensure_positive("area", -1.0).is_err());
        assert!(ensure_positive("area", f64::NAN).is_err());
        assert!(ensure_positive("area", f64::INFINITY).is_err());
    }
}
