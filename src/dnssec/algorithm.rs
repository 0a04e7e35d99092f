use serde::Serialize;
use std::fmt;

/// DNSSEC Algorithm numbers (RFC 4034, 5155, 5702, 5933, 6605, 8080, 8624)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum DnsSecAlgorithm {
    /// RSA/MD5 (deprecated)
    RsaMd5,
    /// Diffie-Hellman (not a signing algorithm)
    DH,
    /// DSA/SHA1 (RFC 2536)
    DSA,
    /// RSA/SHA-1 (RFC 3110)
    RsaSha1,
    /// DSA-NSEC3-SHA1 (RFC 5155)
    DsaNsec3Sha1,
    /// RSASHA1-NSEC3-SHA1 (RFC 5155)
    RsaSha1Nsec3Sha1,
    /// RSA/SHA-256 (RFC 5702)
    RsaSha256,
    /// RSA/SHA-512 (RFC 5702)
    RsaSha512,
    /// GOST R 34.10-2001 (RFC 5933)
    EccGost,
    /// ECDSA Curve P-256 with SHA-256 (RFC 6605)
    EcdsaP256Sha256,
    /// ECDSA Curve P-384 with SHA-384 (RFC 6605)
    EcdsaP384Sha384,
    /// Ed25519 (RFC 8080)
    Ed25519,
    /// Ed448 (RFC 8080)
    Ed448,
    /// Any number without a registry entry we know about
    Unknown(u8),
}

impl DnsSecAlgorithm {
    /// Create from algorithm number. Unassigned numbers map to `Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::RsaMd5,
            2 => Self::DH,
            3 => Self::DSA,
            5 => Self::RsaSha1,
            6 => Self::DsaNsec3Sha1,
            7 => Self::RsaSha1Nsec3Sha1,
            8 => Self::RsaSha256,
            10 => Self::RsaSha512,
            12 => Self::EccGost,
            13 => Self::EcdsaP256Sha256,
            14 => Self::EcdsaP384Sha384,
            15 => Self::Ed25519,
            16 => Self::Ed448,
            other => Self::Unknown(other),
        }
    }

    /// Convert to algorithm number
    pub fn to_u8(self) -> u8 {
        match self {
            Self::RsaMd5 => 1,
            Self::DH => 2,
            Self::DSA => 3,
            Self::RsaSha1 => 5,
            Self::DsaNsec3Sha1 => 6,
            Self::RsaSha1Nsec3Sha1 => 7,
            Self::RsaSha256 => 8,
            Self::RsaSha512 => 10,
            Self::EccGost => 12,
            Self::EcdsaP256Sha256 => 13,
            Self::EcdsaP384Sha384 => 14,
            Self::Ed25519 => 15,
            Self::Ed448 => 16,
            Self::Unknown(value) => value,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Algorithms RFC 8624 says must not or should not be used for signing
    pub fn is_deprecated(&self) -> bool {
        matches!(
            self,
            Self::RsaMd5
                | Self::DH
                | Self::DSA
                | Self::RsaSha1
                | Self::DsaNsec3Sha1
                | Self::RsaSha1Nsec3Sha1
                | Self::EccGost
        )
    }
}

impl From<DnsSecAlgorithm> for String {
    fn from(value: DnsSecAlgorithm) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DnsSecAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaMd5 => write!(f, "RSAMD5"),
            Self::DH => write!(f, "DH"),
            Self::DSA => write!(f, "DSA"),
            Self::RsaSha1 => write!(f, "RSASHA1"),
            Self::DsaNsec3Sha1 => write!(f, "DSA-NSEC3-SHA1"),
            Self::RsaSha1Nsec3Sha1 => write!(f, "RSASHA1-NSEC3-SHA1"),
            Self::RsaSha256 => write!(f, "RSASHA256"),
            Self::RsaSha512 => write!(f, "RSASHA512"),
            Self::EccGost => write!(f, "ECC-GOST"),
            Self::EcdsaP256Sha256 => write!(f, "ECDSAP256SHA256"),
            Self::EcdsaP384Sha384 => write!(f, "ECDSAP384SHA384"),
            Self::Ed25519 => write!(f, "ED25519"),
            Self::Ed448 => write!(f, "ED448"),
            Self::Unknown(value) => write!(f, "UNKNOWN({})", value),
        }
    }
}
