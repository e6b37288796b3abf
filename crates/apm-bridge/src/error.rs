//! Engine error taxonomy.
//!
//! Every variant carries a fixed negative code. The codes are part of the C
//! contract: the facade relays them verbatim, so they must never be
//! renumbered.

/// Errors reported by an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Failure without a more specific classification.
    Unspecified,
    /// The engine could not be constructed.
    CreationFailed,
    /// A requested component is not available in this engine.
    UnsupportedComponent,
    /// A requested function is not available in this engine.
    UnsupportedFunction,
    /// A configuration value is out of range.
    BadParameter,
    /// Unsupported sample rate, or mismatched input/output rates.
    BadSampleRate,
    /// A buffer length does not match its stream format.
    BadDataLength,
    /// Zero channels, or an unsupported input/output channel combination.
    BadNumberChannels,
    /// A stream parameter required by an enabled component was never set.
    StreamParameterNotSet,
    /// The component addressed by the call is disabled.
    NotEnabled,
    /// A stream parameter was out of range and has been clamped. Processing
    /// continues with the clamped value.
    BadStreamParameter,
}

impl Error {
    /// The stable integer code of this error.
    pub const fn code(self) -> i32 {
        match self {
            Self::Unspecified => -1,
            Self::CreationFailed => -2,
            Self::UnsupportedComponent => -3,
            Self::UnsupportedFunction => -4,
            Self::BadParameter => -6,
            Self::BadSampleRate => -7,
            Self::BadDataLength => -8,
            Self::BadNumberChannels => -9,
            Self::StreamParameterNotSet => -11,
            Self::NotEnabled => -12,
            Self::BadStreamParameter => -13,
        }
    }

    /// Looks up the error for a code. Returns `None` for `0` and for codes
    /// outside the taxonomy.
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -1 => Self::Unspecified,
            -2 => Self::CreationFailed,
            -3 => Self::UnsupportedComponent,
            -4 => Self::UnsupportedFunction,
            -6 => Self::BadParameter,
            -7 => Self::BadSampleRate,
            -8 => Self::BadDataLength,
            -9 => Self::BadNumberChannels,
            -11 => Self::StreamParameterNotSet,
            -12 => Self::NotEnabled,
            -13 => Self::BadStreamParameter,
            _ => return None,
        })
    }

    /// Whether this is a warning: the call took effect despite the error.
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::BadStreamParameter)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified error"),
            Self::CreationFailed => write!(f, "engine creation failed"),
            Self::UnsupportedComponent => write!(f, "unsupported component"),
            Self::UnsupportedFunction => write!(f, "unsupported function"),
            Self::BadParameter => write!(f, "bad parameter"),
            Self::BadSampleRate => write!(f, "bad sample rate"),
            Self::BadDataLength => write!(f, "bad data length"),
            Self::BadNumberChannels => write!(f, "bad number of channels"),
            Self::StreamParameterNotSet => write!(f, "stream parameter not set"),
            Self::NotEnabled => write!(f, "component not enabled"),
            Self::BadStreamParameter => write!(f, "bad stream parameter (clamped)"),
        }
    }
}

impl std::error::Error for Error {}
