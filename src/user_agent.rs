//! User-Agent string for fetch requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/fetcher";

/// Default User-Agent for fetch requests (identifies the tool).
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("fetcher/{version} (document-fetcher; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_version_and_project_url() {
        let ua = default_fetch_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("fetcher/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
            "UA must contain crate version"
        );
    }
}
