//! Binary cache of condition trees.
//!
//! A tree is persisted as the token stream the Tree Writer produces for it,
//! so any leaf type with a [`LeafCodec`](crate::LeafCodec) can be cached and
//! reading it back goes through the same registry checks as a text document.
//! The format consists of a 32-byte fixed header followed by a bincode-encoded
//! payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"CFLW"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{Attribute, Token, TokenStream};
use crate::types::{ReadError, WriteError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"CFLW";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`Condition`](crate::Condition) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode condition: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`Condition`](crate::Condition) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a condflow binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedDocument {
    metadata: DocumentMetadata,
    tokens: Vec<SerializedToken>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentMetadata {
    token_count: usize,
    depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum SerializedToken {
    Open {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Close,
}

// ---------------------------------------------------------------------------
// Token conversion
// ---------------------------------------------------------------------------

fn serialize_token(token: Token) -> SerializedToken {
    match token {
        Token::Open { name, attributes } => SerializedToken::Open {
            name,
            attributes: attributes.into_iter().map(|a| (a.name, a.value)).collect(),
        },
        Token::Text(text) => SerializedToken::Text(text),
        Token::Close => SerializedToken::Close,
    }
}

fn deserialize_token(token: SerializedToken) -> Token {
    match token {
        SerializedToken::Open { name, attributes } => Token::Open {
            name,
            attributes: attributes
                .into_iter()
                .map(|(name, value)| Attribute { name, value })
                .collect(),
        },
        SerializedToken::Text(text) => Token::Text(text),
        SerializedToken::Close => Token::Close,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that the tokens form exactly one balanced element and return its
/// nesting depth.
fn measure(tokens: &[SerializedToken]) -> Result<usize, DeserializeError> {
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0 && i > 0 {
            return Err(DeserializeError::Validation(format!(
                "trailing token at position {i} after the root element"
            )));
        }
        match token {
            SerializedToken::Open { .. } => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            SerializedToken::Text(_) if depth == 0 => {
                return Err(DeserializeError::Validation(
                    "text outside the root element".to_owned(),
                ));
            }
            SerializedToken::Text(_) => {}
            SerializedToken::Close => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    DeserializeError::Validation(format!("unmatched close at position {i}"))
                })?;
            }
        }
    }
    if tokens.is_empty() {
        return Err(DeserializeError::Validation("no root element".to_owned()));
    }
    if depth != 0 {
        return Err(DeserializeError::Validation(format!(
            "{depth} element(s) left open"
        )));
    }
    Ok(max_depth)
}

fn validate(ser: &SerializedDocument) -> Result<(), DeserializeError> {
    if ser.metadata.token_count != ser.tokens.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} tokens but payload has {}",
            ser.metadata.token_count,
            ser.tokens.len()
        )));
    }
    let depth = measure(&ser.tokens)?;
    if ser.metadata.depth != depth {
        return Err(DeserializeError::Validation(format!(
            "metadata says depth {} but payload nests {} levels",
            ser.metadata.depth, depth
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] is engine_version, bytes[8..12] flags
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(stream: TokenStream) -> Result<Vec<u8>, SerializeError> {
    let tokens: Vec<SerializedToken> = stream.into_tokens().into_iter().map(serialize_token).collect();
    // Tree Writer output is always a single balanced element.
    let depth = measure(&tokens).unwrap_or(0);
    let serialized = SerializedDocument {
        metadata: DocumentMetadata {
            token_count: tokens.len(),
            depth,
        },
        tokens,
    };
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<TokenStream, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedDocument, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    validate(&serialized)?;
    Ok(serialized
        .tokens
        .into_iter()
        .map(deserialize_token)
        .collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn open(name: &str) -> SerializedToken {
        SerializedToken::Open {
            name: name.to_owned(),
            attributes: Vec::new(),
        }
    }

    fn document(tokens: Vec<SerializedToken>) -> SerializedDocument {
        SerializedDocument {
            metadata: DocumentMetadata {
                token_count: tokens.len(),
                depth: measure(&tokens).unwrap_or(0),
            },
            tokens,
        }
    }

    fn sample() -> TokenStream {
        vec![
            Token::open("anyOf"),
            Token::Open {
                name: "condition".into(),
                attributes: vec![Attribute::new("method", "wildcard")],
            },
            Token::Text("*.pdf".into()),
            Token::Close,
            Token::open("allOf"),
            Token::Close,
            Token::Close,
        ]
        .into()
    }

    #[test]
    fn token_stream_round_trip() {
        let bytes = encode(sample()).unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.into_tokens(), sample().into_tokens());
    }

    // -- Header --

    #[test]
    fn header_round_trip() {
        let payload = b"test payload data";
        let mut buf = Vec::new();
        write_header(&mut buf, payload);
        assert_eq!(buf.len(), HEADER_SIZE);

        let (format_version, payload_len, hash) = read_header(&buf).unwrap();
        assert_eq!(format_version, FORMAT_VERSION);
        assert_eq!(payload_len as usize, payload.len());

        let expected_hash = blake3::hash(payload);
        assert_eq!(&hash, &expected_hash.as_bytes()[..16]);
    }

    #[test]
    fn header_bad_magic() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"BAAD");
        assert!(matches!(read_header(&buf), Err(DeserializeError::BadMagic)));
    }

    #[test]
    fn header_too_short() {
        let buf = vec![0u8; 10];
        assert!(matches!(
            read_header(&buf),
            Err(DeserializeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn version_mismatch() {
        let mut bytes = encode(sample()).unwrap();
        bytes[4..6].copy_from_slice(&7u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(DeserializeError::IncompatibleVersion {
                blob: 7,
                supported: FORMAT_VERSION
            })
        ));
    }

    #[test]
    fn corrupted_payload() {
        let mut bytes = encode(sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode(&bytes), Err(DeserializeError::ChecksumMismatch)));
    }

    #[test]
    fn truncated_payload() {
        let bytes = encode(sample()).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 3]),
            Err(DeserializeError::LengthMismatch { .. })
        ));
    }

    // -- Validation --

    #[test]
    fn measure_accepts_single_element() {
        let tokens = vec![open("a"), open("b"), SerializedToken::Close, SerializedToken::Close];
        assert_eq!(measure(&tokens).unwrap(), 2);
    }

    #[test]
    fn measure_rejects_malformed_streams() {
        let cases = [
            vec![],
            vec![open("a")],
            vec![SerializedToken::Close],
            vec![SerializedToken::Text("x".into())],
            vec![open("a"), SerializedToken::Close, open("b"), SerializedToken::Close],
        ];
        for tokens in cases {
            assert!(
                matches!(measure(&tokens), Err(DeserializeError::Validation(_))),
                "accepted {tokens:?}"
            );
        }
    }

    #[test]
    fn validate_checks_metadata() {
        let mut doc = document(vec![open("a"), SerializedToken::Close]);
        assert!(validate(&doc).is_ok());

        doc.metadata.token_count = 5;
        assert!(matches!(validate(&doc), Err(DeserializeError::Validation(_))));

        let mut doc = document(vec![open("a"), SerializedToken::Close]);
        doc.metadata.depth = 3;
        assert!(matches!(validate(&doc), Err(DeserializeError::Validation(_))));
    }
}
