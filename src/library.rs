use std::path::PathBuf;

use log::info;
use once_cell::unsync::OnceCell;

use crate::metadata::{self, LocalTrack, TagSource};
use crate::scanner::{self, ScanOptions};

/// Result of one library scan; kept for the rest of the session.
#[derive(Debug, Default)]
pub struct SongList {
    pub tracks: Vec<LocalTrack>,
    pub scanned: usize,
    pub filtered_out: usize,
    pub walk_errors: usize,
    pub depth_skipped: Vec<PathBuf>,
}

impl SongList {
    pub fn tag_fallbacks(&self) -> usize {
        self.tracks
            .iter()
            .filter(|track| track.source == TagSource::FileName)
            .count()
    }
}

pub struct Library {
    options: ScanOptions,
    artist_filter: String,
    songs: OnceCell<SongList>,
}

impl Library {
    pub fn new(options: ScanOptions, artist_filter: impl Into<String>) -> Self {
        Self {
            options,
            artist_filter: artist_filter.into(),
            songs: OnceCell::new(),
        }
    }

    /// Scans on first use; later calls return the same list.
    pub fn songs(&self) -> &SongList {
        self.songs.get_or_init(|| self.load())
    }

    fn load(&self) -> SongList {
        let outcome = scanner::scan(&self.options);
        let scanned = outcome.files.len();

        let (tracks, rejected): (Vec<_>, Vec<_>) = outcome
            .files
            .iter()
            .map(|path| metadata::read_local_track(path))
            .partition(|track| track.matches_artist(&self.artist_filter));

        info!(
            "Found {count} songs under '{root}'",
            count = tracks.len(),
            root = self.options.root.display()
        );

        SongList {
            tracks,
            scanned,
            filtered_out: rejected.len(),
            walk_errors: outcome.walk_errors,
            depth_skipped: outcome.depth_skipped,
        }
    }
}
