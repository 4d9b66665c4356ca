//! Payload and host policies deciding what may be saved locally.
//!
//! - [`DocumentKind`] is the fixed allow-list of document types.
//! - [`HostPolicy`] routes document-hosting services that never serve direct
//!   downloads straight to the external-open chain.

use url::Url;

/// Document types that may be persisted to the download directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Text,
}

impl DocumentKind {
    /// Every allow-listed kind, in content-type matching order.
    pub const ALL: [Self; 4] = [Self::Pdf, Self::Doc, Self::Docx, Self::Text];

    /// Canonical MIME type.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Text => "text/plain",
        }
    }

    /// File extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Doc => ".doc",
            Self::Docx => ".docx",
            Self::Text => ".txt",
        }
    }

    fn mime_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["application/pdf", "application/x-pdf"],
            Self::Doc => &["application/msword"],
            Self::Docx => &[
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ],
            Self::Text => &["text/plain"],
        }
    }

    /// Matches a `Content-Type` header value (parameters ignored).
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if essence.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime_aliases().contains(&essence.as_str()))
    }

    /// Matches the extension of a file name or URL path segment.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let dot = name.rfind('.')?;
        let ext = name[dot..].to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }

    /// Matches the extension of the last URL path segment.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let last = url.path_segments()?.next_back()?;
        Self::from_file_name(last)
    }
}

/// Returns the allow-listed kind of a payload: declared type first, then URL.
#[must_use]
pub fn classify_payload(content_type: Option<&str>, url: &Url) -> Option<DocumentKind> {
    content_type
        .and_then(DocumentKind::from_content_type)
        .or_else(|| DocumentKind::from_url(url))
}

/// MIME type handed to a file viewer, derived from the saved file's name.
#[must_use]
pub fn mime_for_file_name(name: &str) -> &'static str {
    if let Some(kind) = DocumentKind::from_file_name(name) {
        return kind.mime();
    }
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else {
        "*/*"
    }
}

/// Host rules for services that must be opened externally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPolicy {
    browser_only: Vec<String>,
}

impl HostPolicy {
    /// Creates a policy from host rules. Rules are normalized to lowercase and
    /// leading or trailing dots are ignored; blank rules are dropped.
    #[must_use]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let browser_only = hosts
            .into_iter()
            .map(|host| {
                host.as_ref()
                    .trim()
                    .trim_matches('.')
                    .to_ascii_lowercase()
            })
            .filter(|host| !host.is_empty())
            .collect();
        Self { browser_only }
    }

    /// Returns the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[String] {
        &self.browser_only
    }

    /// Returns the rule matching the URL's host, if any.
    ///
    /// A host matches when it equals the rule or is a subdomain of it. A
    /// fully-qualified host (`drive.google.com.`) matches like its bare form.
    #[must_use]
    pub fn browser_only_rule(&self, url: &Url) -> Option<&str> {
        let raw = url.host_str()?;
        let host = raw.strip_suffix('.').unwrap_or(raw).to_ascii_lowercase();
        self.browser_only
            .iter()
            .find(|rule| {
                host == **rule
                    || host
                        .strip_suffix(rule.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
            .map(String::as_str)
    }

    /// Returns true if the URL must skip local saving.
    #[must_use]
    pub fn is_browser_only(&self, url: &Url) -> bool {
        self.browser_only_rule(url).is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_content_type_matches_allow_list_ignoring_parameters() {
        assert_eq!(
            DocumentKind::from_content_type("application/pdf"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_content_type("Text/Plain; charset=utf-8"),
            Some(DocumentKind::Text)
        );
        assert_eq!(
            DocumentKind::from_content_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::from_content_type("text/html"), None);
        assert_eq!(DocumentKind::from_content_type(""), None);
    }

    #[test]
    fn test_url_extension_is_case_insensitive_and_ignores_query() {
        assert_eq!(
            DocumentKind::from_url(&url("https://example.com/CV.PDF?dl=1")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_url(&url("https://example.com/notes.txt")),
            Some(DocumentKind::Text)
        );
        assert_eq!(DocumentKind::from_url(&url("https://example.com/page")), None);
        assert_eq!(DocumentKind::from_url(&url("https://example.com/")), None);
    }

    #[test]
    fn test_classify_payload_prefers_header_then_url() {
        let doc_url = url("https://example.com/report.docx");
        assert_eq!(
            classify_payload(Some("application/pdf"), &doc_url),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            classify_payload(Some("application/octet-stream"), &doc_url),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            classify_payload(Some("text/html"), &url("https://example.com/page")),
            None
        );
    }

    #[test]
    fn test_mime_for_file_name_defaults_to_wildcard() {
        assert_eq!(mime_for_file_name("resume.pdf"), "application/pdf");
        assert_eq!(mime_for_file_name("photo.JPG"), "image/jpeg");
        assert_eq!(mime_for_file_name("image.png"), "image/png");
        assert_eq!(mime_for_file_name("archive.download"), "*/*");
    }

    #[test]
    fn test_host_policy_matches_exact_and_subdomains_only() {
        let policy = HostPolicy::new(["drive.google.com", ".Docs.Google.com"]);
        assert!(policy.is_browser_only(&url("https://drive.google.com/file/d/abc/view")));
        assert!(policy.is_browser_only(&url("https://DOCS.google.com/document/d/1")));
        assert!(policy.is_browser_only(&url("https://eu.drive.google.com/x")));
        assert!(!policy.is_browser_only(&url("https://notdrive.google.com/x")));
        assert!(!policy.is_browser_only(&url("https://example.com/drive.google.com")));
        assert_eq!(
            policy.browser_only_rule(&url("https://docs.google.com/x")),
            Some("docs.google.com")
        );
    }

    #[test]
    fn test_host_policy_matches_fully_qualified_host() {
        let policy = HostPolicy::new(["drive.google.com", "docs.google.com."]);
        assert_eq!(
            policy.browser_only_rule(&url("https://drive.google.com./file/d/x")),
            Some("drive.google.com")
        );
        assert!(policy.is_browser_only(&url("https://eu.drive.google.com./x")));
        assert!(policy.is_browser_only(&url("https://docs.google.com/document/d/1")));
        assert!(!policy.is_browser_only(&url("https://google.com./x")));
    }

    #[test]
    fn test_empty_host_policy_matches_nothing() {
        let policy = HostPolicy::new(Vec::<String>::new());
        assert!(!policy.is_browser_only(&url("https://drive.google.com/x")));
        assert!(HostPolicy::new(["  "]).rules().is_empty());
    }
}
