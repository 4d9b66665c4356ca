//! Desktop implementations of [`OpenStrategy`] and [`FileViewer`].
//!
//! Each strategy first builds a [`Launch`] description for the target
//! [`Platform`] and then runs it. Launchers that return promptly (`xdg-open`,
//! `gtk-launch`, `gdbus`, `open`, `cmd /C start`, `rundll32`) are awaited and
//! their exit status decides success. Browsers named by `$BROWSER` usually
//! keep running, so they are spawned detached.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{FileViewer, OpenError, OpenStrategy};

/// Generic type used by [`TypedOpenStrategy`].
const GENERIC_URL_MIME: &str = "text/html";

/// Operating-system family the launch commands are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Other Unix-like systems; treated like Linux where `xdg-utils` exist.
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }

    fn uses_xdg(self) -> bool {
        matches!(self, Self::Linux | Self::Other)
    }
}

/// A fully resolved launcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    /// Program to execute.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Wait for exit and require a zero status, or spawn detached.
    pub wait: bool,
}

impl Launch {
    fn awaited(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            wait: true,
        }
    }

    #[instrument(level = "debug", skip(self), fields(program = %self.program))]
    async fn run(&self) -> Result<(), OpenError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if self.wait {
            let status = command
                .status()
                .await
                .map_err(|e| OpenError::spawn(&self.program, e))?;
            if status.success() {
                Ok(())
            } else {
                Err(OpenError::exited(&self.program, status))
            }
        } else {
            let child = command
                .spawn()
                .map_err(|e| OpenError::spawn(&self.program, e))?;
            debug!(pid = ?child.id(), "launched detached");
            Ok(())
        }
    }
}

/// Strategy (a): the user's declared browser from `$BROWSER`.
///
/// Follows the `$BROWSER` convention: a `:`-separated list of commands, where
/// `%s` is replaced by the URL (or the URL is appended). Entries are tried in
/// order until one starts.
#[derive(Debug, Clone, Default)]
pub struct BrowserEnvStrategy {
    entries: Vec<String>,
}

impl BrowserEnvStrategy {
    /// Creates the strategy from a raw `$BROWSER` value.
    #[must_use]
    pub fn new(browser_var: Option<&str>) -> Self {
        let entries = browser_var
            .unwrap_or("")
            .split(':')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    /// Reads `$BROWSER` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var("BROWSER").ok().as_deref())
    }

    /// Launch descriptions for `url`, one per configured browser.
    #[must_use]
    pub fn launches(&self, url: &str) -> Vec<Launch> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let mut parts = entry.split_whitespace();
                let program = parts.next()?.to_string();
                let mut substituted = false;
                let mut args: Vec<String> = parts
                    .map(|part| {
                        if part.contains("%s") {
                            substituted = true;
                            part.replace("%s", url)
                        } else {
                            part.to_string()
                        }
                    })
                    .collect();
                if !substituted {
                    args.push(url.to_string());
                }
                Some(Launch {
                    program,
                    args,
                    wait: false,
                })
            })
            .collect()
    }
}

#[async_trait]
impl OpenStrategy for BrowserEnvStrategy {
    fn name(&self) -> &str {
        "browser-env"
    }

    async fn open_url(&self, url: &str) -> Result<(), OpenError> {
        let launches = self.launches(url);
        if launches.is_empty() {
            return Err(OpenError::no_handler("BROWSER is not set"));
        }
        let mut last_error = None;
        for launch in &launches {
            match launch.run().await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    debug!(program = %launch.program, error = %error, "browser entry failed");
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| OpenError::no_handler("BROWSER is not set")))
    }
}

/// Strategy (b): the platform's plain open command, no extra flags.
#[derive(Debug, Clone, Copy)]
pub struct SystemOpenStrategy {
    platform: Platform,
}

impl SystemOpenStrategy {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Launch description for `target` (a URL or a path).
    #[must_use]
    pub fn launch(&self, target: &str) -> Launch {
        plain_open(self.platform, target)
    }
}

#[async_trait]
impl OpenStrategy for SystemOpenStrategy {
    fn name(&self) -> &str {
        "system-open"
    }

    async fn open_url(&self, url: &str) -> Result<(), OpenError> {
        self.launch(url).run().await
    }
}

/// Strategy (c): open with the default handler of an explicit generic type
/// (`text/html`).
#[derive(Debug, Clone, Copy)]
pub struct TypedOpenStrategy {
    platform: Platform,
}

impl TypedOpenStrategy {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Launch description once the handler for the generic type is known.
    ///
    /// `handler` is the desktop entry id on XDG systems and ignored elsewhere.
    /// Returns `None` where the platform has no typed launcher.
    #[must_use]
    pub fn launch(&self, handler: &str, url: &str) -> Option<Launch> {
        match self.platform {
            Platform::Linux | Platform::Other => {
                Some(Launch::awaited("gtk-launch", &[handler, url]))
            }
            Platform::Windows => Some(Launch::awaited(
                "rundll32",
                &["url.dll,FileProtocolHandler", url],
            )),
            Platform::MacOs => None,
        }
    }
}

#[async_trait]
impl OpenStrategy for TypedOpenStrategy {
    fn name(&self) -> &str {
        "typed-open"
    }

    async fn open_url(&self, url: &str) -> Result<(), OpenError> {
        let handler = if self.platform.uses_xdg() {
            query_default_handler(GENERIC_URL_MIME).await?.ok_or_else(|| {
                OpenError::no_handler(format!("no default handler for {GENERIC_URL_MIME}"))
            })?
        } else {
            String::new()
        };
        let launch = self.launch(&handler, url).ok_or_else(|| {
            OpenError::no_handler("typed open is not supported on this platform")
        })?;
        launch.run().await
    }
}

/// Strategy (d): ask the user to pick an application.
///
/// Uses the XDG desktop portal `OpenURI` call with `ask` set, which shows the
/// application chooser.
#[derive(Debug, Clone, Copy)]
pub struct ChooserStrategy {
    platform: Platform,
}

impl ChooserStrategy {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Launch description for `url`, or `None` without a chooser facility.
    #[must_use]
    pub fn launch(&self, url: &str) -> Option<Launch> {
        if !self.platform.uses_xdg() {
            return None;
        }
        Some(Launch::awaited(
            "gdbus",
            &[
                "call",
                "--session",
                "--dest",
                "org.freedesktop.portal.Desktop",
                "--object-path",
                "/org/freedesktop/portal/desktop",
                "--method",
                "org.freedesktop.portal.OpenURI.OpenURI",
                "",
                url,
                "{'ask': <true>}",
            ],
        ))
    }
}

#[async_trait]
impl OpenStrategy for ChooserStrategy {
    fn name(&self) -> &str {
        "chooser"
    }

    async fn open_url(&self, url: &str) -> Result<(), OpenError> {
        let launch = self
            .launch(url)
            .ok_or_else(|| OpenError::no_handler("no application chooser on this platform"))?;
        launch.run().await
    }
}

/// Opens saved files with the viewer registered for their MIME type.
#[derive(Debug, Clone, Copy)]
pub struct SystemFileViewer {
    platform: Platform,
}

impl SystemFileViewer {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl FileViewer for SystemFileViewer {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn open_file(&self, path: &Path, mime: &str) -> Result<(), OpenError> {
        if self.platform.uses_xdg() && mime != "*/*" {
            let handler = query_default_handler(mime).await?;
            if handler.is_none() {
                return Err(OpenError::no_handler(format!("no viewer registered for {mime}")));
            }
            debug!(handler = ?handler, "viewer registered");
        }
        let target = path.to_string_lossy();
        plain_open(self.platform, &target).run().await
    }
}

fn plain_open(platform: Platform, target: &str) -> Launch {
    match platform {
        Platform::Linux | Platform::Other => Launch::awaited("xdg-open", &[target]),
        Platform::MacOs => Launch::awaited("open", &[target]),
        Platform::Windows => {
            let escaped = escape_cmd_argument(target);
            Launch::awaited("cmd", &["/C", "start", "", escaped.as_str()])
        }
    }
}

/// Escapes characters `cmd.exe` would otherwise interpret (`&`, `|`, ...).
fn escape_cmd_argument(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '&' | '|' | '<' | '>' | '^') {
            out.push('^');
        }
        out.push(ch);
    }
    out
}

/// Asks `xdg-mime` for the desktop entry handling `mime`.
async fn query_default_handler(mime: &str) -> Result<Option<String>, OpenError> {
    let output = Command::new("xdg-mime")
        .args(["query", "default", mime])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| OpenError::spawn("xdg-mime", e))?;
    if !output.status.success() {
        return Err(OpenError::exited("xdg-mime", output.status));
    }
    Ok(parse_handler_query(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_handler_query(stdout: &str) -> Option<String> {
    let handler = stdout.lines().next()?.trim();
    (!handler.is_empty()).then(|| handler.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/cv.pdf?a=1&b=2";

    #[test]
    fn test_browser_env_appends_url_without_placeholder() {
        let strategy = BrowserEnvStrategy::new(Some("firefox:chromium --incognito"));
        let launches = strategy.launches(URL);
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].program, "firefox");
        assert_eq!(launches[0].args, vec![URL.to_string()]);
        assert!(!launches[0].wait, "browsers must be spawned detached");
        assert_eq!(launches[1].program, "chromium");
        assert_eq!(launches[1].args, vec!["--incognito".to_string(), URL.to_string()]);
    }

    #[test]
    fn test_browser_env_substitutes_placeholder() {
        let strategy = BrowserEnvStrategy::new(Some("w3m -T text/html %s"));
        let launches = strategy.launches(URL);
        assert_eq!(
            launches[0].args,
            vec!["-T".to_string(), "text/html".to_string(), URL.to_string()]
        );
    }

    #[tokio::test]
    async fn test_browser_env_unset_is_no_handler() {
        let strategy = BrowserEnvStrategy::new(None);
        assert!(strategy.launches(URL).is_empty());
        let result = strategy.open_url(URL).await;
        assert!(matches!(result, Err(OpenError::NoHandler { .. })));
    }

    #[test]
    fn test_system_open_commands_per_platform() {
        let linux = SystemOpenStrategy::new(Platform::Linux).launch(URL);
        assert_eq!(linux, Launch::awaited("xdg-open", &[URL]));

        let mac = SystemOpenStrategy::new(Platform::MacOs).launch(URL);
        assert_eq!(mac, Launch::awaited("open", &[URL]));

        let windows = SystemOpenStrategy::new(Platform::Windows).launch(URL);
        assert_eq!(windows.program, "cmd");
        assert_eq!(
            windows.args,
            vec![
                "/C".to_string(),
                "start".to_string(),
                String::new(),
                "https://example.com/cv.pdf?a=1^&b=2".to_string()
            ]
        );
    }

    #[test]
    fn test_typed_open_commands_per_platform() {
        let linux = TypedOpenStrategy::new(Platform::Linux)
            .launch("firefox.desktop", URL)
            .unwrap();
        assert_eq!(linux, Launch::awaited("gtk-launch", &["firefox.desktop", URL]));

        let windows = TypedOpenStrategy::new(Platform::Windows)
            .launch("", URL)
            .unwrap();
        assert_eq!(windows.program, "rundll32");

        assert!(TypedOpenStrategy::new(Platform::MacOs).launch("", URL).is_none());
    }

    #[test]
    fn test_chooser_uses_portal_with_ask() {
        let launch = ChooserStrategy::new(Platform::Linux).launch(URL).unwrap();
        assert_eq!(launch.program, "gdbus");
        assert!(launch.args.iter().any(|a| a == "org.freedesktop.portal.OpenURI.OpenURI"));
        assert!(launch.args.iter().any(|a| a == URL));
        assert_eq!(launch.args.last().unwrap(), "{'ask': <true>}");
        assert!(ChooserStrategy::new(Platform::Windows).launch(URL).is_none());
    }

    #[tokio::test]
    async fn test_chooser_without_facility_is_no_handler() {
        let result = ChooserStrategy::new(Platform::MacOs).open_url(URL).await;
        assert!(matches!(result, Err(OpenError::NoHandler { .. })));
    }

    #[tokio::test]
    async fn test_missing_launcher_is_no_handler() {
        let launch = Launch::awaited("definitely-not-a-real-launcher-binary", &[URL]);
        let result = launch.run().await;
        assert!(matches!(result, Err(OpenError::NoHandler { .. })), "got {result:?}");
    }

    #[test]
    fn test_parse_handler_query() {
        assert_eq!(
            parse_handler_query("org.gnome.Evince.desktop\n"),
            Some("org.gnome.Evince.desktop".to_string())
        );
        assert_eq!(parse_handler_query("\n"), None);
        assert_eq!(parse_handler_query(""), None);
    }

    #[test]
    fn test_platform_current_matches_target() {
        let platform = Platform::current();
        if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Linux);
        }
    }
}
