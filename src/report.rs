use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

use crate::library::SongList;

#[derive(Debug, Default)]
pub struct Report {
    pub scanned: usize,
    pub songs: usize,
    pub filtered_out: usize,
    pub resolved: usize,
    pub written: usize,
    pub kept_existing: usize,
    pub not_found: usize,
    pub missing_lyrics: usize,
    pub empty_queries: usize,
    pub request_errors: usize,
    pub walk_errors: usize,
    pub tag_fallbacks: usize,
    pub depth_skip_paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub scanned: usize,
    pub songs: usize,
    pub filtered_out: usize,
    pub resolved: usize,
    pub written: usize,
    pub kept_existing: usize,
    pub not_found: usize,
    pub missing_lyrics: usize,
    pub empty_queries: usize,
    pub request_errors: usize,
    pub walk_errors: usize,
    pub tag_fallbacks: usize,
    pub depth_skipped_dirs: usize,
    pub depth_skip_paths: Vec<PathBuf>,
}

impl Report {
    pub fn from_library(songs: &SongList) -> Self {
        Self {
            scanned: songs.scanned,
            songs: songs.tracks.len(),
            filtered_out: songs.filtered_out,
            walk_errors: songs.walk_errors,
            tag_fallbacks: songs.tag_fallbacks(),
            depth_skip_paths: songs.depth_skipped.clone(),
            ..Self::default()
        }
    }

    pub fn record_resolved(&mut self) {
        self.resolved += 1;
    }

    pub fn record_written(&mut self) {
        self.written += 1;
    }

    pub fn record_kept_existing(&mut self) {
        self.kept_existing += 1;
    }

    pub fn record_not_found(&mut self) {
        self.not_found += 1;
    }

    pub fn record_missing_lyrics(&mut self) {
        self.missing_lyrics += 1;
    }

    pub fn record_empty_query(&mut self) {
        self.empty_queries += 1;
    }

    pub fn record_request_error(&mut self) {
        self.request_errors += 1;
    }

    pub fn summary(&self) -> Summary {
        Summary {
            scanned: self.scanned,
            songs: self.songs,
            filtered_out: self.filtered_out,
            resolved: self.resolved,
            written: self.written,
            kept_existing: self.kept_existing,
            not_found: self.not_found,
            missing_lyrics: self.missing_lyrics,
            empty_queries: self.empty_queries,
            request_errors: self.request_errors,
            walk_errors: self.walk_errors,
            tag_fallbacks: self.tag_fallbacks,
            depth_skipped_dirs: self.depth_skip_paths.len(),
            depth_skip_paths: self.depth_skip_paths.clone(),
        }
    }

    pub fn emit_summary(&self) {
        info!(
            "Scanned {scanned} files -- {songs} songs, resolved {resolved}, wrote {written} lyrics, not found {not_found}, missing lyrics {missing}, kept existing {kept}",
            scanned = self.scanned,
            songs = self.songs,
            resolved = self.resolved,
            written = self.written,
            not_found = self.not_found,
            missing = self.missing_lyrics,
            kept = self.kept_existing,
        );

        for path in &self.depth_skip_paths {
            info!(
                "Depth limit prevented descent into directory '{}'",
                path.display()
            );
        }

        if self.request_errors > 0 || self.walk_errors > 0 {
            warn!(
                "Encountered {requests} failed requests and {walks} traversal errors.",
                requests = self.request_errors,
                walks = self.walk_errors
            );
        }
    }
}
