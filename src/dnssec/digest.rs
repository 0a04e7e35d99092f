use serde::Serialize;
use std::fmt;

/// DS digest type algorithms (RFC 4034, 4509, 5933, 6605)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum DigestType {
    /// SHA-1 (RFC 3658)
    Sha1,
    /// SHA-256 (RFC 4509)
    Sha256,
    /// GOST R 34.11-94 (RFC 5933)
    Gost94,
    /// SHA-384 (RFC 6605)
    Sha384,
    /// Reserved or unassigned digest number
    Unknown(u8),
}

impl DigestType {
    /// Create from digest type number. Unassigned numbers map to `Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Sha1,
            2 => Self::Sha256,
            3 => Self::Gost94,
            4 => Self::Sha384,
            other => Self::Unknown(other),
        }
    }

    /// Convert to digest type number
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Sha1 => 1,
            Self::Sha256 => 2,
            Self::Gost94 => 3,
            Self::Sha384 => 4,
            Self::Unknown(value) => value,
        }
    }

    /// Expected digest length in bytes, if the type is known
    pub fn digest_len(&self) -> Option<usize> {
        match self {
            Self::Sha1 => Some(20),
            Self::Sha256 => Some(32),
            Self::Gost94 => Some(32),
            Self::Sha384 => Some(48),
            Self::Unknown(_) => None,
        }
    }
}

impl From<DigestType> for String {
    fn from(value: DigestType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DigestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA-1"),
            Self::Sha256 => write!(f, "SHA-256"),
            Self::Gost94 => write!(f, "GOST R 34.11-94"),
            Self::Sha384 => write!(f, "SHA-384"),
            Self::Unknown(value) => write!(f, "UNKNOWN({})", value),
        }
    }
}
