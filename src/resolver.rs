use log::debug;

use crate::error::ResolveError;
use crate::lyrics::{LyricsSource, SyncedLyrics};
use crate::spotify::{CatalogTrack, TrackCatalog, TrackQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub track: CatalogTrack,
    /// `None` when the track matched but has no synced lyrics.
    pub lyrics: Option<SyncedLyrics>,
}

/// Search first, then lyrics for whatever the search picked.
pub struct SongResolver<C, L> {
    catalog: C,
    lyrics: L,
}

impl<C: TrackCatalog, L: LyricsSource> SongResolver<C, L> {
    pub fn new(catalog: C, lyrics: L) -> Self {
        Self { catalog, lyrics }
    }

    pub fn resolve(&self, query: &TrackQuery) -> Result<Resolution, ResolveError> {
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let track = self.catalog.search(query)?;
        debug!(
            "Matched '{query}' to '{name}' by {artist} ({id})",
            name = track.name,
            artist = track.artist,
            id = track.id
        );

        let lyrics = match self.lyrics.fetch(&track) {
            Ok(lyrics) => Some(lyrics),
            Err(ResolveError::LyricsNotFound(id)) => {
                debug!("No synced lyrics for {id}");
                None
            }
            Err(error) => return Err(error),
        };

        Ok(Resolution { track, lyrics })
    }
}
