use thiserror::Error;

/// Failures of the song resolution workflow.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("no catalog match for '{0}'")]
    TrackNotFound(String),
    #[error("no synced lyrics available for track {0}")]
    LyricsNotFound(String),
    #[error("token request rejected with HTTP {status}: {body}")]
    TokenRejected { status: u16, body: String },
    #[error("{endpoint} request failed with HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ResolveError {
    /// True for outcomes that mean "nothing to find" rather than a broken request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TrackNotFound(_) | Self::LyricsNotFound(_))
    }
}
