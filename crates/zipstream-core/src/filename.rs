//! Suggested archive filename for a `Content-Disposition` header.

/// Fallback when nothing usable survives escaping.
pub const DEFAULT_ARCHIVE_NAME: &str = "archive.zip";

/// Escape a raw suggested filename for use inside a quoted
/// `Content-Disposition: attachment; filename="..."` value.
///
/// - Keeps printable US-ASCII only (RFC 2183 section 2.3), i.e. 0x20..=0x7E
/// - Drops `"`, which would terminate the quoted value
/// - Empty or bare `.zip` results become `archive.zip`
/// - Appends `.zip` unless already present
pub fn escape_suggested_filename(raw: &str) -> String {
    let escaped: String = raw
        .chars()
        .filter(|c| (' '..='~').contains(c) && *c != '"')
        .collect();

    if escaped.is_empty() || escaped == ".zip" {
        return DEFAULT_ARCHIVE_NAME.to_string();
    }
    if escaped.ends_with(".zip") {
        escaped
    } else {
        escaped + ".zip"
    }
}
