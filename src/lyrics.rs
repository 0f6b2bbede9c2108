//! Time-synced lyrics from the Spotify lyrics proxy, rendered as LRC text.

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::spotify::CatalogTrack;

pub const DEFAULT_LYRICS_URL: &str = "https://spotify-lyric-api-984e7b4face0.herokuapp.com/";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsPayload {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub sync_type: Option<String>,
    #[serde(default)]
    pub lines: Vec<LyricsLine>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsLine {
    #[serde(default)]
    pub start_time_ms: String,
    #[serde(default)]
    pub words: String,
    pub time_tag: Option<String>,
}

impl LyricsLine {
    fn tag(&self) -> String {
        match self.time_tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag.to_owned(),
            _ => format_time_tag(self.start_time_ms.trim().parse().unwrap_or(0)),
        }
    }
}

/// Lyrics ready to be written: one LRC body line per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedLyrics {
    pub synced: bool,
    pub lines: Vec<String>,
}

/// `[ti:]`, `[ar:]` and `[al:]` tags written above the body.
#[derive(Debug, Clone, Copy)]
pub struct LrcHeader<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub album: Option<&'a str>,
}

impl SyncedLyrics {
    pub fn from_payload(payload: &LyricsPayload) -> Self {
        let synced = !matches!(payload.sync_type.as_deref(), Some("UNSYNCED"));
        let lines = payload
            .lines
            .iter()
            .map(|line| {
                if synced {
                    format!("[{}]{}", line.tag(), line.words)
                } else {
                    line.words.clone()
                }
            })
            .collect();

        Self { synced, lines }
    }

    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    pub fn to_lrc(&self, header: Option<LrcHeader<'_>>) -> String {
        let mut out = String::new();
        if let Some(header) = header {
            out.push_str(&format!("[ti:{}]\n", header.title));
            if !header.artist.is_empty() {
                out.push_str(&format!("[ar:{}]\n", header.artist));
            }
            if let Some(album) = header.album.filter(|album| !album.is_empty()) {
                out.push_str(&format!("[al:{album}]\n"));
            }
        }
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// `mm:ss.xx` for a millisecond offset.
pub fn format_time_tag(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    let centis = (millis % 1_000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

pub trait LyricsSource {
    fn fetch(&self, track: &CatalogTrack) -> Result<SyncedLyrics, ResolveError>;
}

pub struct LyricsClient {
    http: Client,
    base_url: String,
}

impl LyricsClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_owned(),
        }
    }
}

impl LyricsSource for LyricsClient {
    fn fetch(&self, track: &CatalogTrack) -> Result<SyncedLyrics, ResolveError> {
        debug!("Fetching lyrics for track {}", track.id);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("trackid", track.id.as_str()), ("format", "lrc")])
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::LyricsNotFound(track.id.clone()));
        }
        if !status.is_success() {
            return Err(ResolveError::Status {
                endpoint: "lyrics",
                status: status.as_u16(),
            });
        }

        let payload: LyricsPayload = response.json()?;
        if payload.error {
            debug!(
                "Lyrics service reported an error for {}: {}",
                track.id,
                payload.message.as_deref().unwrap_or("no message")
            );
            return Err(ResolveError::LyricsNotFound(track.id.clone()));
        }

        let lyrics = SyncedLyrics::from_payload(&payload);
        if lyrics.lines.is_empty() {
            return Err(ResolveError::LyricsNotFound(track.id.clone()));
        }
        Ok(lyrics)
    }
}
