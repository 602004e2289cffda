use std::fmt;

/// The one recoverable error this crate's API surfaces. Returned from
/// entry points that accept raw bytes instead of an already-validated
/// `&str`; the rope is left byte-for-byte unchanged when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RopeError {
    /// The bytes passed to `try_insert`/`TryFrom<&[u8]>` are not well-formed
    /// UTF-8.
    InvalidUtf8,
}

impl fmt::Display for RopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RopeError::InvalidUtf8 => write!(f, "input is not valid UTF-8"),
        }
    }
}

impl std::error::Error for RopeError {}
