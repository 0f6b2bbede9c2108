use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::lyrics::{LrcHeader, SyncedLyrics};
use crate::metadata::LocalTrack;
use crate::spotify::CatalogTrack;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// A sidecar already exists and overwriting is off.
    KeptExisting(PathBuf),
    DryRun,
}

/// One line of the json output format.
#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    path: &'a Path,
    title: &'a str,
    artist: &'a str,
    album: Option<&'a str>,
    spotify_id: &'a str,
    spotify_url: Option<&'a str>,
    cover_url: Option<&'a str>,
    synced: bool,
    lyrics: String,
}

pub struct OutputWriter {
    format: OutputFormat,
    sink: Option<BufWriter<File>>,
    dry_run: bool,
    overwrite: bool,
}

impl OutputWriter {
    pub fn create(format: OutputFormat, output: &Path, dry_run: bool, overwrite: bool) -> Result<Self> {
        let sink = if dry_run || format == OutputFormat::Lrc {
            None
        } else {
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directories for '{}'", output.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(output)
                .with_context(|| format!("failed to open output file '{}'", output.display()))?;
            Some(BufWriter::new(file))
        };

        Ok(Self {
            format,
            sink,
            dry_run,
            overwrite,
        })
    }

    pub fn write_entry(
        &mut self,
        local: &LocalTrack,
        track: &CatalogTrack,
        lyrics: &SyncedLyrics,
    ) -> Result<WriteOutcome> {
        if self.dry_run {
            return Ok(WriteOutcome::DryRun);
        }

        match self.format {
            OutputFormat::Lrc => self.write_sidecar(local, track, lyrics),
            OutputFormat::Text => {
                let block = format_block(track, lyrics);
                self.append(block.as_bytes())
                    .context("failed to append lyrics to output file")?;
                Ok(WriteOutcome::Written)
            }
            OutputFormat::Json => {
                let entry = JsonEntry {
                    path: &local.path,
                    title: &track.name,
                    artist: &track.artist,
                    album: track.album.as_deref(),
                    spotify_id: &track.id,
                    spotify_url: track.url.as_deref(),
                    cover_url: track.cover_url.as_deref(),
                    synced: lyrics.synced,
                    lyrics: lyrics.body(),
                };
                let mut json = serde_json::to_string(&entry)
                    .context("failed to serialize lyrics entry as JSON")?;
                json.push('\n');
                self.append(json.as_bytes())
                    .context("failed to append JSON lyrics to output file")?;
                Ok(WriteOutcome::Written)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()
                .context("failed to flush buffered lyrics to output file")?;
        }
        Ok(())
    }

    fn write_sidecar(
        &self,
        local: &LocalTrack,
        track: &CatalogTrack,
        lyrics: &SyncedLyrics,
    ) -> Result<WriteOutcome> {
        let path = sidecar_path(&local.path);
        if path.exists() && !self.overwrite {
            return Ok(WriteOutcome::KeptExisting(path));
        }

        let document = lyrics.to_lrc(Some(LrcHeader {
            title: &track.name,
            artist: &track.artist,
            album: track.album.as_deref(),
        }));
        fs::write(&path, document)
            .with_context(|| format!("failed to write lyrics file '{}'", path.display()))?;
        Ok(WriteOutcome::Written)
    }

    fn append(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.write_all(bytes),
            None => Ok(()),
        }
    }
}

pub fn sidecar_path(audio: &Path) -> PathBuf {
    audio.with_extension("lrc")
}

pub fn format_block(track: &CatalogTrack, lyrics: &SyncedLyrics) -> String {
    let mut block = format!("=== {} ===\nArtist: {}\n", track.name, track.artist);
    if let Some(url) = &track.url {
        block.push_str(&format!("Spotify: {url}\n"));
    }
    block.push_str(&lyrics.body());
    block.push_str("\n\n");
    block
}
