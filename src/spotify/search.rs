use std::fmt;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::token::TokenProvider;
use crate::error::ResolveError;

/// What we know about a local song when asking the catalog for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub title: String,
    pub artist: Option<String>,
}

impl TrackQuery {
    pub fn new(title: impl Into<String>, artist: Option<String>) -> Self {
        Self {
            title: title.into(),
            artist,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Field-filtered query string understood by the search endpoint.
    pub fn to_search_string(&self) -> String {
        let title = self.title.trim();
        match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => format!("track:{title} artist:{artist}"),
            _ => format!("track:{title}"),
        }
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.artist.as_deref().filter(|artist| !artist.trim().is_empty()) {
            Some(artist) => write!(f, "{} by {}", self.title.trim(), artist.trim()),
            None => f.write_str(self.title.trim()),
        }
    }
}

/// First search hit, reduced to what gets displayed and written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub cover_url: Option<String>,
    pub url: Option<String>,
    pub duration_ms: u64,
}

pub trait TrackCatalog {
    fn search(&self, query: &TrackQuery) -> Result<CatalogTrack, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    album: Option<AlbumObject>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    duration_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl SearchResponse {
    fn first_track(self) -> Option<CatalogTrack> {
        self.tracks.items.into_iter().next().map(CatalogTrack::from)
    }
}

impl From<TrackObject> for CatalogTrack {
    fn from(track: TrackObject) -> Self {
        let artist = track
            .artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let (album, cover_url) = match track.album {
            Some(album) => {
                // The API lists album art widest first.
                let cover = album.images.into_iter().next().map(|image| image.url);
                (Some(album.name), cover)
            }
            None => (None, None),
        };

        Self {
            id: track.id,
            name: track.name,
            artist,
            album,
            cover_url,
            url: track.external_urls.spotify,
            duration_ms: track.duration_ms,
        }
    }
}

pub struct SpotifyCatalog {
    http: Client,
    api_url: String,
    market: Option<String>,
    tokens: TokenProvider,
}

impl SpotifyCatalog {
    pub fn new(
        http: Client,
        api_url: &str,
        market: Option<String>,
        tokens: TokenProvider,
    ) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
            market,
            tokens,
        }
    }

    fn send_search(&self, q: &str, token: &str) -> Result<Response, ResolveError> {
        let mut params = vec![("q", q), ("type", "track"), ("limit", "1")];
        if let Some(market) = self.market.as_deref() {
            params.push(("market", market));
        }

        let response = self
            .http
            .get(format!("{}/search", self.api_url))
            .bearer_auth(token)
            .query(&params)
            .send()?;
        Ok(response)
    }
}

impl TrackCatalog for SpotifyCatalog {
    fn search(&self, query: &TrackQuery) -> Result<CatalogTrack, ResolveError> {
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let q = query.to_search_string();
        debug!("Searching catalog for '{q}'");

        let token = self.tokens.access_token()?;
        let mut response = self.send_search(&q, &token)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Search endpoint rejected the cached access token; fetching a new one");
            self.tokens.invalidate();
            let token = self.tokens.access_token()?;
            response = self.send_search(&q, &token)?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                endpoint: "search",
                status: status.as_u16(),
            });
        }

        let payload: SearchResponse = response.json()?;
        payload
            .first_track()
            .ok_or_else(|| ResolveError::TrackNotFound(query.to_string()))
    }
}
