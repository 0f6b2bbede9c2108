use std::path::{Path, PathBuf};

use id3::{Tag, TagLike};
use log::debug;
use serde::Serialize;

use crate::spotify::TrackQuery;

/// Where a local track's title and artist came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    Tags,
    FileName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalTrack {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_ms: Option<u64>,
    pub source: TagSource,
}

impl LocalTrack {
    pub fn query(&self) -> TrackQuery {
        TrackQuery::new(self.title.clone(), self.artist.clone())
    }

    /// Case-insensitive substring match; an empty needle matches everything.
    pub fn matches_artist(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.artist
            .as_deref()
            .is_some_and(|artist| artist.to_lowercase().contains(&needle))
    }

    pub fn display_artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown Artist")
    }
}

pub fn read_local_track(path: &Path) -> LocalTrack {
    match Tag::read_from_path(path) {
        Ok(tag) => from_tag(path, &tag),
        Err(error) => {
            debug!(
                "No usable ID3 tag in '{}' ({error}); using the file name",
                path.display()
            );
            from_file_name(path)
        }
    }
}

fn from_tag(path: &Path, tag: &Tag) -> LocalTrack {
    let artist = non_empty(tag.artist()).or_else(|| non_empty(tag.album_artist()));
    let album = non_empty(tag.album());
    let duration_ms = tag.duration().map(u64::from);

    match non_empty(tag.title()) {
        Some(title) => LocalTrack {
            path: path.to_path_buf(),
            title,
            artist,
            album,
            duration_ms,
            source: TagSource::Tags,
        },
        None => {
            let fallback = from_file_name(path);
            LocalTrack {
                artist: artist.or(fallback.artist),
                album,
                duration_ms,
                ..fallback
            }
        }
    }
}

/// `Artist - Title.mp3` splits into both fields, anything else is all title.
pub fn from_file_name(path: &Path) -> LocalTrack {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (artist, title) = match stem.split_once(" - ") {
        Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            (Some(artist.trim().to_owned()), title.trim().to_owned())
        }
        _ => (None, stem.trim().to_owned()),
    };

    LocalTrack {
        path: path.to_path_buf(),
        title,
        artist,
        album: None,
        duration_ms: None,
        source: TagSource::FileName,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
