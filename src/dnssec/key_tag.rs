use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Calculate the key tag for a DNSKEY record (RFC 4034 Appendix B)
pub fn calculate_key_tag(flags: u16, protocol: u8, algorithm: u8, public_key: &[u8]) -> u16 {
    // Algorithm 1 (RSAMD5): most significant 16 of the least significant
    // 24 bits of the modulus (B.1)
    if algorithm == 1 {
        if public_key.len() >= 3 {
            return u16::from_be_bytes([
                public_key[public_key.len() - 3],
                public_key[public_key.len() - 2],
            ]);
        }
        return 0;
    }

    let mut accumulator: u32 = 0;

    // DNSKEY RDATA: flags (2) + protocol (1) + algorithm (1) + public key
    let mut rdata = Vec::with_capacity(4 + public_key.len());
    rdata.extend_from_slice(&flags.to_be_bytes());
    rdata.push(protocol);
    rdata.push(algorithm);
    rdata.extend_from_slice(public_key);

    for (i, &byte) in rdata.iter().enumerate() {
        if i % 2 == 0 {
            accumulator += u32::from(byte) << 8;
        } else {
            accumulator += u32::from(byte);
        }
    }

    accumulator += (accumulator >> 16) & 0xFFFF;
    (accumulator & 0xFFFF) as u16
}

/// Key tag for a DNSKEY whose public key is in presentation (base64) form.
///
/// Whitespace inside the key is ignored, as zone files and `dig` output
/// split long keys over several chunks.
pub fn key_tag_from_base64(
    flags: u16,
    protocol: u8,
    algorithm: u8,
    public_key: &str,
) -> Result<u16, base64::DecodeError> {
    let compact: String = public_key.split_whitespace().collect();
    let key_bytes = STANDARD.decode(compact.as_bytes())?;
    Ok(calculate_key_tag(flags, protocol, algorithm, &key_bytes))
}
