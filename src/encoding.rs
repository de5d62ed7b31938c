//! Base64 encoding of uploaded images for Gemini `inlineData` parts.

use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use std::io::Write;

/// Bytes handed to the encoder per write.
pub const CHUNK_SIZE: usize = 8192;

/// Encode `bytes` as padded STANDARD base64, feeding the encoder in
/// [`CHUNK_SIZE`] slices. The streaming encoder carries partial 3-byte groups
/// across writes, so the output matches a single-pass encode for any length.
pub fn encode_chunked(bytes: &[u8]) -> Result<String> {
    let mut encoder = EncoderStringWriter::new(&STANDARD);
    for chunk in bytes.chunks(CHUNK_SIZE) {
        encoder.write_all(chunk)?;
    }
    Ok(encoder.into_inner())
}
