//! Content-type ↔ file-extension lookup for stored media.

/// Extensions for the media types the gateway actually exchanges. These win
/// over `mime_guess`, whose first candidate is not always the usual one.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("audio/ogg", "ogg"),
    ("audio/mpeg", "mp3"),
    ("audio/aac", "aac"),
    ("audio/amr", "amr"),
    ("audio/mp4", "m4a"),
    ("video/mp4", "mp4"),
    ("video/3gpp", "3gp"),
    ("application/pdf", "pdf"),
    ("text/plain", "txt"),
];

/// File extension (without the dot) for a content type, ignoring parameters.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence.is_empty() {
        return None;
    }

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(ct, _)| *ct == essence) {
        return Some(*ext);
    }

    mime_guess::get_mime_extensions_str(&essence).and_then(|exts| exts.first().copied())
}

/// Content type for a file extension, with or without the leading dot.
#[must_use]
pub fn content_type_for(extension: &str) -> Option<String> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        return None;
    }

    if let Some((ct, _)) = PREFERRED_EXTENSIONS.iter().find(|(_, e)| *e == ext) {
        return Some((*ct).to_string());
    }

    mime_guess::from_ext(&ext)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
