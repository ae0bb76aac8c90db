//! Item name to suffix mapping.

/// Suffix of an item name: the text after the last `.` of the final path
/// component, without the dot.
///
/// Returns `None` for names without an extension and for dot-files such as
/// `.hidden`. The suffix is returned verbatim; lookups are case-sensitive.
///
/// ```
/// use itemcodecs::suffix_of;
///
/// assert_eq!(suffix_of("meas/data.json"), Some("json"));
/// assert_eq!(suffix_of("archive.tar.gz"), Some("gz"));
/// assert_eq!(suffix_of("README"), None);
/// ```
pub fn suffix_of(name: &str) -> Option<&str> {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rsplit_once('.') {
        Some((stem, suffix)) if !stem.is_empty() && !suffix.is_empty() => Some(suffix),
        _ => None,
    }
}
