//! File names for stored payloads.
//!
//! A caller-suggested name only contributes its base: the extension always
//! comes from the classified [`FormatTag`], never from the name.

use chrono::NaiveDateTime;

use crate::types::FormatTag;

/// Prefix of generated names when the upload did not suggest one.
pub const DEFAULT_NAME_PREFIX: &str = "ecg_upload_";

/// Suffix appended to the base name of an XML payload's extracted PDF.
pub const EXTRACTED_SUFFIX: &str = "_extracted.pdf";

/// Reduce a suggested name to a safe bare file name.
///
/// Drops any directory part (`/` or `\` separated) and surrounding whitespace.
/// Returns `None` for names that cannot be used inside the storage directory.
pub fn sanitize_suggested_name(name: &str) -> Option<&str> {
    let candidate = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();

    if candidate.is_empty() || candidate == "." || candidate == ".." || candidate.contains('\0') {
        return None;
    }

    Some(candidate)
}

/// Remove the final extension, keeping names that only start with dots intact.
///
/// `report.xml` becomes `report`, `a.b.c` becomes `a.b`, `.hidden` stays `.hidden`.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if name[..idx].bytes().any(|b| b != b'.') => &name[..idx],
        _ => name,
    }
}

/// `ecg_upload_YYYYMMDD_HHMMSS` for the given local time.
///
/// Two unnamed uploads within the same second share this name; the later
/// one overwrites the earlier.
pub fn default_base_name(timestamp: NaiveDateTime) -> String {
    format!("{}{}", DEFAULT_NAME_PREFIX, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Base name for a payload: the sanitized suggestion without its extension,
/// or the timestamp default.
pub fn base_name(suggested: Option<&str>, timestamp: NaiveDateTime) -> String {
    suggested
        .and_then(sanitize_suggested_name)
        .map(strip_extension)
        .filter(|base| !base.is_empty())
        .map(String::from)
        .unwrap_or_else(|| default_base_name(timestamp))
}

/// Format the suggested name's extension claims, if it names a known one.
///
/// Only used to report misnamed uploads; stored names never keep it.
pub fn hinted_format(suggested: &str) -> Option<FormatTag> {
    let name = sanitize_suggested_name(suggested)?;
    let base = strip_extension(name);
    if base.len() == name.len() {
        return None;
    }
    FormatTag::from_extension(&name[base.len()..])
}

pub fn primary_file_name(base: &str, format: FormatTag) -> String {
    format!("{}{}", base, format.extension())
}

pub fn extracted_file_name(base: &str) -> String {
    format!("{}{}", base, EXTRACTED_SUFFIX)
}
