/// Result type returned by parameter resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid experiment parameters. Raised once, at resolution time; nothing
/// downstream of the resolver runs on a bad configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("configuration error: `{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("configuration error: `{field}` = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("configuration error: `{field}` = {value} is not a whole multiple of `{of}`")]
    NotWholeMultiple {
        field: &'static str,
        value: f64,
        of: &'static str,
    },

    #[error(
        "configuration error: resolution {width}x{height} cannot hold a {diameter} px stimulus"
    )]
    Resolution {
        width: u32,
        height: u32,
        diameter: u32,
    },

    #[error(
        "configuration error: a sweep spans {frames} frames, half-sweep blanks need an even count"
    )]
    OddSweepFrames { frames: usize },
}

impl ConfigError {
    pub fn non_positive(field: &'static str, value: impl Into<f64>) -> Self {
        Self::NonPositive {
            field,
            value: value.into(),
        }
    }

    pub fn out_of_range(field: &'static str, value: impl Into<f64>, expected: &'static str) -> Self {
        Self::OutOfRange {
            field,
            value: value.into(),
            expected,
        }
    }

    /// Name of the offending parameter, when the error concerns a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::NonPositive { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotWholeMultiple { field, .. } => Some(field),
            Self::Resolution { .. } => Some("resolution"),
            Self::OddSweepFrames { .. } => None,
        }
    }
}

/// Violations of the frame library's append-only contract.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("frame is {got_width}x{got_height}, library holds {width}x{height} frames")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("library already sealed with blank frame at index {blank}")]
    Sealed { blank: usize },

    #[error("library layout expects {expected} sweep frames, found {found}")]
    Incomplete { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_field_and_value() {
        let err = ConfigError::non_positive("sampling_interval", 0.0);
        let msg = err.to_string();
        assert!(msg.contains("sampling_interval"));
        assert!(msg.contains('0'));
        assert_eq!(err.field(), Some("sampling_interval"));
    }

    #[test]
    fn odd_sweep_has_no_single_field() {
        assert_eq!(ConfigError::OddSweepFrames { frames: 21 }.field(), None);
        assert!(
            ConfigError::OddSweepFrames { frames: 21 }
                .to_string()
                .contains("21 frames")
        );
    }
}
