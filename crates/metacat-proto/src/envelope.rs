//! Envelope encoding with size limits.
//!
//! Every stored entity is written as an [`EntityEnvelope`]. Encoding and
//! decoding both enforce a maximum size so that a corrupt length prefix or an
//! oversized record cannot force a large allocation.

use crate::messages::{entity_envelope::Payload, EntityEnvelope};
use crate::Error;
use prost::Message;

/// Default maximum encoded envelope size (4 MB).
pub const MAX_ENTITY_SIZE: usize = 4 * 1024 * 1024;

/// Encode a payload into envelope bytes.
pub fn encode_envelope(payload: Payload, max_size: usize) -> Result<Vec<u8>, Error> {
    let envelope = EntityEnvelope {
        payload: Some(payload),
    };

    let size = envelope.encoded_len();
    if size > max_size {
        return Err(Error::TooLarge {
            size,
            max: max_size,
        });
    }

    let mut buf = Vec::with_capacity(size);
    envelope.encode(&mut buf)?;
    Ok(buf)
}

/// Decode envelope bytes into the carried payload.
pub fn decode_envelope(bytes: &[u8], max_size: usize) -> Result<Payload, Error> {
    if bytes.len() > max_size {
        return Err(Error::TooLarge {
            size: bytes.len(),
            max: max_size,
        });
    }

    let envelope = EntityEnvelope::decode(bytes)?;
    envelope.payload.ok_or(Error::EmptyEnvelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{AuditInfo, Table};

    fn sample_table() -> Payload {
        Payload::Table(Table {
            id: Some(7),
            name: Some("orders".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_envelope_roundtrip() {
        let bytes = encode_envelope(sample_table(), MAX_ENTITY_SIZE).unwrap();
        let payload = decode_envelope(&bytes, MAX_ENTITY_SIZE).unwrap();
        assert_eq!(payload, sample_table());
        assert_eq!(payload.type_name(), "table");
    }

    #[test]
    fn test_empty_audit_payload_is_present() {
        let bytes =
            encode_envelope(Payload::AuditInfo(AuditInfo::default()), MAX_ENTITY_SIZE).unwrap();
        // tag 1, wire type 2, length 0
        assert_eq!(bytes, vec![0x0A, 0x00]);

        let payload = decode_envelope(&bytes, MAX_ENTITY_SIZE).unwrap();
        assert_eq!(payload, Payload::AuditInfo(AuditInfo::default()));
    }

    #[test]
    fn test_empty_bytes_have_no_payload() {
        let result = decode_envelope(&[], MAX_ENTITY_SIZE);
        assert!(matches!(result, Err(Error::EmptyEnvelope)));
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let bytes = encode_envelope(sample_table(), MAX_ENTITY_SIZE).unwrap();
        let result = decode_envelope(&bytes[..bytes.len() - 1], MAX_ENTITY_SIZE);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_size_limit() {
        let result = encode_envelope(sample_table(), 4);
        assert!(matches!(result, Err(Error::TooLarge { max: 4, .. })));

        let bytes = encode_envelope(sample_table(), MAX_ENTITY_SIZE).unwrap();
        let result = decode_envelope(&bytes, 4);
        assert!(matches!(result, Err(Error::TooLarge { .. })));
    }
}
