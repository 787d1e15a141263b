//! Path segmentation shared by route patterns and request paths.

use percent_encoding::percent_decode_str;

/// Splits a `/`-delimited pattern or path into its non-empty segments.
///
/// Empty segments are dropped, so leading, trailing and doubled slashes
/// normalize away. Scanning stops right after the first segment that starts
/// with `*`: nothing past a catch-all is reachable.
pub fn split_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        segments.push(segment);
        if segment.starts_with('*') {
            break;
        }
    }
    segments
}

/// Percent-decodes `raw`, replacing invalid UTF-8 with U+FFFD.
pub fn percent_decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Splits a raw request path, then decodes each segment on its own.
///
/// An encoded `%2F` stays inside its segment instead of splitting it.
pub fn decode_segments(raw_path: &str) -> Vec<String> {
    split_segments(raw_path)
        .into_iter()
        .map(percent_decode)
        .collect()
}
