//! Filename selection and sanitization for saved documents.

use std::path::{Component, Path};

use url::Url;

use super::constants::{DEFAULT_FILE_PREFIX, FALLBACK_EXTENSION};
use super::policy::DocumentKind;

/// Where a saved file's name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Suggested,
    ContentDisposition,
    Generated,
}

/// An on-disk name and its origin.
///
/// Given names (suggested or `Content-Disposition`) replace an existing file
/// of the same name. Generated names never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenName {
    pub name: String,
    pub source: NameSource,
}

impl ChosenName {
    /// Returns true if the name was generated rather than given.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.source == NameSource::Generated
    }
}

/// Chooses the on-disk name for a saved payload.
///
/// Priority:
/// 1. The caller's suggested name (sanitized)
/// 2. The `Content-Disposition` filename
/// 3. `<prefix>_<unix-millis><ext>`
#[must_use]
pub fn choose_filename(
    suggested: &str,
    content_disposition: Option<&str>,
    content_type: Option<&str>,
    url: &Url,
    prefix: &str,
) -> ChosenName {
    if let Some(name) = usable_name(suggested) {
        return ChosenName {
            name,
            source: NameSource::Suggested,
        };
    }

    if let Some(name) = content_disposition
        .and_then(parse_content_disposition)
        .as_deref()
        .and_then(usable_name)
    {
        return ChosenName {
            name,
            source: NameSource::ContentDisposition,
        };
    }

    ChosenName {
        name: generate_filename(prefix, content_type, url),
        source: NameSource::Generated,
    }
}

/// Builds `<prefix>_<unix-millis><ext>` with the extension inferred from the
/// content type, then the URL, then [`FALLBACK_EXTENSION`].
#[must_use]
pub fn generate_filename(prefix: &str, content_type: Option<&str>, url: &Url) -> String {
    let extension = content_type
        .and_then(DocumentKind::from_content_type)
        .or_else(|| DocumentKind::from_url(url))
        .map_or(FALLBACK_EXTENSION, DocumentKind::extension);
    let prefix = {
        let cleaned = sanitize_filename(prefix.trim());
        if cleaned.trim_matches('_').is_empty() {
            DEFAULT_FILE_PREFIX.to_string()
        } else {
            cleaned
        }
    };
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{prefix}_{timestamp}{extension}")
}

/// Numbered alternative for a taken name.
///
/// Example with `n = 2`: `file.pdf` becomes `file_2.pdf`.
pub(crate) fn numbered_variant(filename: &str, n: usize) -> String {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => format!("{}_{n}{}", &filename[..pos], &filename[pos..]),
        _ => format!("{filename}_{n}"),
    }
}

fn usable_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let sanitized = sanitize_filename(trimmed);
    (!sanitized.trim_matches(|c| c == '_' || c == '.').is_empty()).then_some(sanitized)
}

/// Parses Content-Disposition header to extract filename.
///
/// Handles both:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987)
///
/// Parameter names match case-insensitively.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `header`.
    let lowered = header.to_ascii_lowercase();
    if let Some(pos) = lowered.find("filename*=") {
        let value = header[pos + 10..].trim();
        // Format: charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    if let Some(pos) = lowered.find("filename=") {
        let value = header[pos + 9..].trim();

        if let Some(stripped) = value.strip_prefix('"') {
            if let Some(end) = stripped.find('"') {
                return Some(stripped[..end].to_string());
            }
        } else {
            let end = value.find(';').unwrap_or(value.len());
            let filename = value[..end].trim();
            if !filename.is_empty() {
                return Some(filename.to_string());
            }
        }
    }

    None
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
