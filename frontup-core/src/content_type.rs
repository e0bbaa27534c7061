//! Content type lookup by file extension.
//!
//! Values follow the widely used `mime-types` database, so `.js` is
//! `application/javascript` rather than `text/javascript`.

use std::path::Path;

use mime::Mime;

/// Look up the content type for `path` from its extension (case-insensitive).
///
/// Returns `None` when the extension is missing or unknown; such objects are
/// uploaded without a `Content-Type`.
pub fn lookup(path: &Path) -> Option<Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let essence = match ext.as_str() {
        // Web / Text
        "html" | "htm" | "shtml" => "text/html",
        "css" => "text/css",
        "js" | "mjs" | "cjs" => "application/javascript",
        "json" | "map" => "application/json",
        "jsonld" => "application/ld+json",
        "webmanifest" => "application/manifest+json",
        "xml" => "application/xml",
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "yaml" | "yml" => "text/yaml",
        "ics" => "text/calendar",
        "vtt" => "text/vtt",

        // Web feeds
        "rss" => "application/rss+xml",
        "atom" => "application/atom+xml",

        // Images
        "svg" | "svgz" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/vnd.microsoft.icon",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",

        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",

        // Documents / Binary
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    essence.parse().ok()
}

/// Whether the body should be treated as text when read.
pub fn is_text(mime: &Mime) -> bool {
    mime.type_() == mime::TEXT
}
