const FALLBACK_MIME: &str = "application/octet-stream";

/// Sniff an image MIME type from magic bytes. Used when the upload part
/// declares no usable content type.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, 0x68, 0x65, 0x69, 0x63, ..] => "image/heic",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                FALLBACK_MIME
            );
            FALLBACK_MIME
        }
    }
}

/// Prefer the declared content type, sniffing only when it is missing or generic.
pub fn resolve_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() && mime != FALLBACK_MIME => mime.to_string(),
        _ => detect_image_mime(bytes).to_string(),
    }
}
