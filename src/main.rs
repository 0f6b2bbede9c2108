mod cli;
mod config;
mod error;
mod http;
mod library;
mod lyrics;
mod metadata;
mod report;
mod resolver;
mod scanner;
mod spotify;
#[cfg(test)]
mod test_server;
mod writer;

use std::path::Path;

use anyhow::{Context, Result};
use env_logger::Builder;
use log::LevelFilter;

use crate::config::{LibraryConfig, Mode, SpotifyConfig, SyncConfig};
use crate::error::ResolveError;
use crate::library::Library;
use crate::lyrics::{LrcHeader, LyricsClient};
use crate::metadata::LocalTrack;
use crate::resolver::SongResolver;
use crate::spotify::{SpotifyCatalog, TokenProvider, TrackQuery};
use crate::writer::{OutputWriter, WriteOutcome};

type SpotifyResolver = SongResolver<SpotifyCatalog, LyricsClient>;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli_args = cli::CliArgs::parse();

    let config = config::Config::from_args(cli_args)?;
    init_logging(config.quiet);

    match &config.mode {
        Mode::Scan(library) => run_scan(library),
        Mode::Sync {
            library,
            sync,
            spotify,
        } => run_sync(library, sync, spotify),
        Mode::Lookup { query, spotify } => run_lookup(query, spotify),
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };

    let mut builder =
        Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if quiet {
        builder.filter_level(LevelFilter::Error);
    }
    let _ = builder.try_init();
}

fn build_resolver(config: &SpotifyConfig) -> Result<SpotifyResolver> {
    let http = http::build_client(config.timeout).context("failed to build HTTP client")?;
    let tokens = TokenProvider::new(
        http.clone(),
        config.token_url.as_str(),
        config.credentials.clone(),
        config.strategy.clone(),
    );
    let catalog = SpotifyCatalog::new(
        http.clone(),
        &config.api_url,
        config.market.clone(),
        tokens,
    );
    let lyrics = LyricsClient::new(http, &config.lyrics_url);
    Ok(SongResolver::new(catalog, lyrics))
}

fn run_scan(config: &LibraryConfig) -> Result<()> {
    let library = Library::new(config.scan.clone(), config.artist_filter.as_str());
    let songs = library.songs();

    for track in &songs.tracks {
        println!(
            "{artist} - {title}\t{path}",
            artist = track.display_artist(),
            title = track.title,
            path = track.path.display()
        );
    }

    report::Report::from_library(songs).emit_summary();
    Ok(())
}

fn run_sync(library: &LibraryConfig, sync: &SyncConfig, spotify: &SpotifyConfig) -> Result<()> {
    let resolver = build_resolver(spotify)?;
    let library = Library::new(library.scan.clone(), library.artist_filter.as_str());
    let songs = library.songs();

    let mut report = report::Report::from_library(songs);
    let mut writer = OutputWriter::create(sync.format, &sync.output, sync.dry_run, sync.overwrite)?;

    for local in &songs.tracks {
        sync_track(&resolver, local, &mut writer, &mut report)?;
    }

    writer.flush()?;
    report.emit_summary();

    if let Some(summary_path) = &sync.summary_json {
        write_summary(summary_path, &report)?;
    }

    Ok(())
}

fn sync_track(
    resolver: &SpotifyResolver,
    local: &LocalTrack,
    writer: &mut OutputWriter,
    report: &mut report::Report,
) -> Result<()> {
    let query = local.query();
    let resolution = match resolver.resolve(&query) {
        Ok(resolution) => resolution,
        Err(ResolveError::EmptyQuery) => {
            report.record_empty_query();
            log::warn!(
                "Skipping '{}' -- no title to search for.",
                local.path.display()
            );
            return Ok(());
        }
        Err(error) if error.is_not_found() => {
            report.record_not_found();
            log::info!("No Spotify match for '{query}'");
            return Ok(());
        }
        Err(error @ ResolveError::TokenRejected { .. }) => {
            return Err(error).context("could not obtain a Spotify access token");
        }
        Err(error) => {
            report.record_request_error();
            log::warn!("Failed to resolve '{query}': {error}");
            return Ok(());
        }
    };
    report.record_resolved();

    let track = &resolution.track;
    let Some(lyrics) = &resolution.lyrics else {
        report.record_missing_lyrics();
        log::info!(
            "Matched '{query}' to '{name}' by {artist} -- no synced lyrics available.",
            name = track.name,
            artist = track.artist
        );
        return Ok(());
    };

    match writer.write_entry(local, track, lyrics)? {
        WriteOutcome::Written => {
            report.record_written();
            log::info!(
                "Captured lyrics for '{name}' by {artist}",
                name = track.name,
                artist = track.artist
            );
        }
        WriteOutcome::KeptExisting(path) => {
            report.record_kept_existing();
            log::info!("Keeping existing lyrics file '{}'", path.display());
        }
        WriteOutcome::DryRun => {
            log::info!(
                "Dry run: would write lyrics for '{name}' by {artist}",
                name = track.name,
                artist = track.artist
            );
        }
    }

    Ok(())
}

fn run_lookup(query: &TrackQuery, spotify: &SpotifyConfig) -> Result<()> {
    let resolver = build_resolver(spotify)?;
    let resolution = resolver
        .resolve(query)
        .with_context(|| format!("failed to resolve '{query}'"))?;
    let track = &resolution.track;

    println!("{} - {}", track.artist, track.name);
    if let Some(album) = &track.album {
        println!("Album: {album}");
    }
    if let Some(url) = &track.url {
        println!("Spotify: {url}");
    }
    if let Some(cover) = &track.cover_url {
        println!("Cover: {cover}");
    }

    match &resolution.lyrics {
        Some(lyrics) => {
            println!();
            print!(
                "{}",
                lyrics.to_lrc(Some(LrcHeader {
                    title: &track.name,
                    artist: &track.artist,
                    album: track.album.as_deref(),
                }))
            );
        }
        None => log::warn!("No synced lyrics available for '{}'", track.name),
    }

    Ok(())
}

fn write_summary(path: &Path, report: &report::Report) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create directories for summary '{}'",
                parent.display()
            )
        })?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create summary file '{}'", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report.summary())
        .with_context(|| format!("failed to write JSON summary to '{}'", path.display()))?;
    Ok(())
}
