//! Codec boundary between raw frames and wire element trees.
//!
//! The provider core only ever sees [`GlowRoot`] values. A [`Codec`] turns one
//! received frame into a root and one outbound root into the bytes of a frame.
//! [`JsonLinesCodec`] is the bundled implementation: each frame is a single
//! JSON document terminated by a newline.

use thiserror::Error;

use crate::element::GlowRoot;

/// Failure to turn a frame into a wire tree.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame carried no content.
    #[error("empty frame")]
    Empty,
    /// The frame did not hold a valid wire tree.
    #[error("malformed frame: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to turn a wire tree into a frame.
#[derive(Debug, Error)]
#[error("failed to encode wire tree: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Tree-to-bytes transform used by the transport.
pub trait Codec: Send + Sync {
    /// Decodes one complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the frame is empty or malformed.
    fn decode(&self, frame: &[u8]) -> Result<GlowRoot, DecodeError>;

    /// Encodes one wire tree into a complete frame, delimiter included.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] when serialization fails.
    fn encode(&self, root: &GlowRoot) -> Result<Vec<u8>, EncodeError>;

    /// Byte that terminates a frame on the stream.
    fn delimiter(&self) -> u8;
}

/// Newline-delimited JSON codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesCodec;

impl Codec for JsonLinesCodec {
    fn decode(&self, frame: &[u8]) -> Result<GlowRoot, DecodeError> {
        let trimmed = frame.trim_ascii();
        if trimmed.is_empty() {
            return Err(DecodeError::Empty);
        }
        serde_json::from_slice(trimmed).map_err(|source| DecodeError::Malformed {
            message: source.to_string(),
            source,
        })
    }

    fn encode(&self, root: &GlowRoot) -> Result<Vec<u8>, EncodeError> {
        let mut frame = serde_json::to_vec(root)?;
        frame.push(b'\n');
        Ok(frame)
    }

    fn delimiter(&self) -> u8 {
        b'\n'
    }
}
