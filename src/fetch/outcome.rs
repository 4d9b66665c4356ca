//! Terminal result classification for a fetch-and-open attempt.

use std::fmt;

/// Result of a single [`Fetcher::fetch`](super::Fetcher::fetch) call.
///
/// Every failure inside a fetch (network, disk, missing handlers) is folded
/// into one of these variants; `fetch` never returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The resource was saved locally and opened in a registered viewer.
    Success,
    /// The URL was handed to an external application (browser or chooser).
    OpenedExternally,
    /// The URL was empty, malformed, or not `http`/`https`.
    InvalidInput,
    /// The server answered successfully with a zero-length body.
    EmptyPayload,
    /// The body could not be persisted to the download directory.
    WriteFailed,
    /// Neither a file viewer nor any external-open strategy was available.
    NoHandlerAvailable,
    /// The payload type is outside the document allow-list.
    UnsupportedPayloadType,
    /// HTTP error status, or `None` for a transport-level failure.
    NetworkFailure(Option<u16>),
    /// Catch-all for failures that fit no other category.
    UnknownFailure,
}

impl FetchOutcome {
    /// Returns true when something was opened for the user.
    #[must_use]
    pub fn is_opened(self) -> bool {
        matches!(self, Self::Success | Self::OpenedExternally)
    }

    /// Returns true when the caller should re-offer an explicit
    /// "open in browser" action to the user.
    #[must_use]
    pub fn should_retry_in_browser(self) -> bool {
        matches!(
            self,
            Self::NetworkFailure(_)
                | Self::NoHandlerAvailable
                | Self::WriteFailed
                | Self::UnsupportedPayloadType
        )
    }

    /// HTTP status carried by a [`FetchOutcome::NetworkFailure`], if any.
    #[must_use]
    pub fn status_code(self) -> Option<u16> {
        match self {
            Self::NetworkFailure(code) => code,
            _ => None,
        }
    }

    /// Stable machine-readable label, used in logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::OpenedExternally => "opened_externally",
            Self::InvalidInput => "invalid_input",
            Self::EmptyPayload => "empty_payload",
            Self::WriteFailed => "write_failed",
            Self::NoHandlerAvailable => "no_handler_available",
            Self::UnsupportedPayloadType => "unsupported_payload_type",
            Self::NetworkFailure(_) => "network_failure",
            Self::UnknownFailure => "unknown_failure",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("File opened successfully"),
            Self::OpenedExternally => f.write_str("Link opened in the browser"),
            Self::InvalidInput => f.write_str("Invalid link"),
            Self::EmptyPayload => f.write_str("The file is empty"),
            Self::WriteFailed => f.write_str("Could not save the file"),
            Self::NoHandlerAvailable => {
                f.write_str("Could not open the link. Check that a browser is installed")
            }
            Self::UnsupportedPayloadType => f.write_str("Unsupported file type"),
            Self::NetworkFailure(Some(code)) => write!(f, "Network error: code {code}"),
            Self::NetworkFailure(None) => f.write_str("Network error: no response"),
            Self::UnknownFailure => f.write_str("Unknown error"),
        }
    }
}
