use std::path::{Path, PathBuf};

use log::warn;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    /// Subdirectories at this depth or deeper are not entered; the root is depth 0.
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<PathBuf>,
    pub walk_errors: usize,
    pub depth_skipped: Vec<PathBuf>,
}

impl ScanOptions {
    fn stops_at(&self, entry: &DirEntry) -> bool {
        match self.max_depth {
            Some(limit) => {
                entry.depth() > 0 && entry.depth() >= limit && entry.file_type().is_dir()
            }
            None => false,
        }
    }

    fn accepts(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file() && has_extension(entry.path(), &self.extensions)
    }
}

/// Walks the root in file-name order and collects audio files.
pub fn scan(options: &ScanOptions) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let mut walker = WalkDir::new(&options.root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(error) => {
                outcome.walk_errors += 1;
                match error.path() {
                    Some(path) => warn!("Traversal error on '{}': {error}", path.display()),
                    None => warn!("Traversal error: {error}"),
                }
                continue;
            }
        };

        if options.stops_at(&entry) {
            outcome.depth_skipped.push(entry.into_path());
            walker.skip_current_dir();
            continue;
        }

        if options.accepts(&entry) {
            outcome.files.push(entry.into_path());
        }
    }

    outcome
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| extensions.iter().any(|allowed| *allowed == ext))
}
