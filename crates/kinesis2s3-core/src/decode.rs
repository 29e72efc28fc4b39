// Record payload decoding
//
// Kinesis hands us base64 text; producers may additionally gzip the payload
// (CloudWatch Logs subscriptions always do). Compression is sniffed from the
// magic bytes, there is no content-encoding flag to trust.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use flate2::read::GzDecoder;
use std::io::Read;

use crate::error::DecodeError;

/// gzip magic number
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decode a base64 transport string into raw bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(BASE64_STANDARD.decode(data.trim().as_bytes())?)
}

/// Returns true when the payload starts with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= GZIP_MAGIC.len() && bytes[..2] == GZIP_MAGIC
}

/// Turn raw (already base64-decoded) payload bytes into text,
/// gunzipping first when the magic number is present.
pub fn decode_payload(bytes: Vec<u8>) -> Result<String, DecodeError> {
    let bytes = if is_gzip(&bytes) {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(DecodeError::Gzip)?;
        tracing::debug!(
            compressed = bytes.len(),
            decompressed = decompressed.len(),
            "Decompressed gzip payload"
        );
        decompressed
    } else {
        bytes
    };

    Ok(String::from_utf8(bytes)?)
}

/// Full decoder for one record: base64, optional gzip, UTF-8.
pub fn decode_record(data: &str) -> Result<String, DecodeError> {
    decode_payload(decode_base64(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_base64() {
        let encoded = BASE64_STANDARD.encode(br#"{"log_type":"app"}"#);
        assert_eq!(decode_record(&encoded).unwrap(), r#"{"log_type":"app"}"#);
    }

    #[test]
    fn test_gzip_detected_by_magic() {
        let encoded = BASE64_STANDARD.encode(gzip(b"hello gzip"));
        assert_eq!(decode_record(&encoded).unwrap(), "hello gzip");
    }

    #[test]
    fn test_short_payloads_are_not_gzip() {
        assert!(!is_gzip(&[]));
        assert!(!is_gzip(&[0x1f]));
        assert_eq!(decode_payload(b"x".to_vec()).unwrap(), "x");
        assert_eq!(decode_payload(Vec::new()).unwrap(), "");
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let err = decode_record("not base64!!").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let encoded = BASE64_STANDARD.encode([0xff, 0xfe, 0xfd]);
        let err = decode_record(&encoded).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn test_truncated_gzip_is_an_error() {
        let mut compressed = gzip(b"some longer text that will be truncated");
        compressed.truncate(12);
        let err = decode_payload(compressed).unwrap_err();
        assert!(matches!(err, DecodeError::Gzip(_)));
    }
}
