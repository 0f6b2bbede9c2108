//! Spotify Web API access: bearer-token acquisition and track search.

mod search;
mod token;

pub use search::{CatalogTrack, SpotifyCatalog, TrackCatalog, TrackQuery};
pub use token::{Credentials, TokenProvider, TokenStrategy};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
