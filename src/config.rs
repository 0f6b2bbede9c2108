use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::{CliArgs, Command, OutputFormat, ScanArgs, SpotifyArgs, TokenGrant};
use crate::scanner::ScanOptions;
use crate::spotify::{Credentials, TokenStrategy, TrackQuery};

#[derive(Debug, Clone)]
pub struct Config {
    pub quiet: bool,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Scan(LibraryConfig),
    Sync {
        library: LibraryConfig,
        sync: SyncConfig,
        spotify: SpotifyConfig,
    },
    Lookup {
        query: TrackQuery,
        spotify: SpotifyConfig,
    },
}

#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub scan: ScanOptions,
    pub artist_filter: String,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub format: OutputFormat,
    pub output: PathBuf,
    pub overwrite: bool,
    pub dry_run: bool,
    pub summary_json: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub credentials: Credentials,
    pub strategy: TokenStrategy,
    pub token_url: String,
    pub api_url: String,
    pub lyrics_url: String,
    pub market: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let mode = match args.command {
            Command::Scan(scan) => Mode::Scan(LibraryConfig::from_args(scan)?),
            Command::Sync(sync) => {
                let library = LibraryConfig::from_args(sync.scan)?;
                let root = library.scan.root.clone();
                let output = make_absolute(&root, sync.output.unwrap_or_else(|| "lyrics.txt".into()));
                let summary_json = sync.summary_json.map(|path| make_absolute(&root, path));

                Mode::Sync {
                    library,
                    sync: SyncConfig {
                        format: sync.format,
                        output,
                        overwrite: sync.overwrite,
                        dry_run: sync.dry_run,
                        summary_json,
                    },
                    spotify: SpotifyConfig::from_args(args.spotify)?,
                }
            }
            Command::Lookup(lookup) => Mode::Lookup {
                query: TrackQuery::new(lookup.title, lookup.artist),
                spotify: SpotifyConfig::from_args(args.spotify)?,
            },
        };

        Ok(Self {
            quiet: args.quiet,
            mode,
        })
    }
}

impl LibraryConfig {
    fn from_args(args: ScanArgs) -> Result<Self> {
        Ok(Self {
            scan: ScanOptions {
                root: normalize_root(args.root)?,
                extensions: parse_extensions(&args.extensions),
                max_depth: args.max_depth,
                follow_symlinks: args.follow_symlinks,
            },
            artist_filter: args.artist_filter,
        })
    }
}

impl SpotifyConfig {
    fn from_args(args: SpotifyArgs) -> Result<Self> {
        let client_id = required(args.client_id, "client id", "--client-id", "SPOTIFY_CLIENT_ID")?;
        let client_secret = required(
            args.client_secret,
            "client secret",
            "--client-secret",
            "SPOTIFY_CLIENT_SECRET",
        )?;

        let strategy = match args.token_strategy {
            TokenGrant::ClientCredentials => TokenStrategy::ClientCredentials,
            TokenGrant::RefreshToken => TokenStrategy::RefreshToken(required(
                args.refresh_token,
                "refresh token",
                "--refresh-token",
                "SPOTIFY_REFRESH_TOKEN",
            )?),
        };

        anyhow::ensure!(args.timeout_secs > 0, "--timeout-secs must be at least 1");

        Ok(Self {
            credentials: Credentials {
                client_id,
                client_secret,
            },
            strategy,
            token_url: args.token_url,
            api_url: args.api_url,
            lyrics_url: args.lyrics_url,
            market: args
                .market
                .map(|market| market.trim().to_ascii_uppercase())
                .filter(|market| !market.is_empty()),
            timeout: Duration::from_secs(args.timeout_secs),
        })
    }
}

fn required(value: Option<String>, what: &str, flag: &str, env: &str) -> Result<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .with_context(|| format!("missing Spotify {what}; pass {flag} or set {env}"))
}

fn normalize_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let resolved = match root {
        Some(path) if path.is_absolute() => path,
        Some(path) => current_dir()?.join(path),
        None => current_dir()?,
    };
    anyhow::ensure!(
        resolved.is_dir(),
        "The library root '{}' is not an existing directory.",
        resolved.display()
    );
    Ok(resolved)
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("could not resolve current working directory")
}

fn make_absolute(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    let exts: Vec<String> = raw
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();

    if exts.is_empty() {
        vec!["mp3".to_string()]
    } else {
        exts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    use crate::cli::{LookupArgs, SyncArgs};

    fn spotify_args() -> SpotifyArgs {
        SpotifyArgs {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            refresh_token: None,
            token_strategy: TokenGrant::ClientCredentials,
            token_url: crate::spotify::DEFAULT_TOKEN_URL.into(),
            api_url: crate::spotify::DEFAULT_API_URL.into(),
            lyrics_url: crate::lyrics::DEFAULT_LYRICS_URL.into(),
            market: None,
            timeout_secs: 10,
        }
    }

    fn scan_args(root: Option<PathBuf>) -> ScanArgs {
        ScanArgs {
            root,
            extensions: "mp3".into(),
            artist_filter: String::new(),
            max_depth: None,
            follow_symlinks: false,
        }
    }

    fn sync_args(root: PathBuf) -> SyncArgs {
        SyncArgs {
            scan: scan_args(Some(root)),
            format: OutputFormat::Lrc,
            output: None,
            overwrite: false,
            dry_run: false,
            summary_json: None,
        }
    }

    fn args(spotify: SpotifyArgs, command: Command) -> CliArgs {
        CliArgs {
            spotify,
            quiet: false,
            command,
        }
    }

    #[test]
    fn scan_defaults_to_current_directory_without_credentials() {
        let cwd = std::env::current_dir().unwrap();
        let mut spotify = spotify_args();
        spotify.client_id = None;
        spotify.client_secret = None;

        let config = Config::from_args(args(spotify, Command::Scan(scan_args(None)))).unwrap();

        let Mode::Scan(library) = config.mode else {
            panic!("expected scan mode");
        };
        assert_eq!(library.scan.root, cwd);
        assert_eq!(library.scan.extensions, vec!["mp3"]);
        assert_eq!(library.artist_filter, "");
        assert!(!config.quiet);
    }

    #[test]
    fn sync_resolves_outputs_against_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("library");
        fs::create_dir(&root).unwrap();

        let mut sync = sync_args(root.clone());
        sync.scan.extensions = " .MP3, flac ,,".into();
        sync.format = OutputFormat::Json;
        sync.output = Some(PathBuf::from("out/lyrics.jsonl"));
        sync.summary_json = Some(PathBuf::from("summary.json"));
        let mut spotify = spotify_args();
        spotify.market = Some(" se ".into());

        let config = Config::from_args(args(spotify, Command::Sync(sync))).unwrap();

        let Mode::Sync {
            library,
            sync,
            spotify,
        } = config.mode
        else {
            panic!("expected sync mode");
        };
        assert_eq!(library.scan.root, root);
        assert_eq!(library.scan.extensions, vec!["mp3", "flac"]);
        assert_eq!(sync.format, OutputFormat::Json);
        assert_eq!(sync.output, root.join("out/lyrics.jsonl"));
        assert_eq!(sync.summary_json, Some(root.join("summary.json")));
        assert_eq!(spotify.market.as_deref(), Some("SE"));
        assert_eq!(spotify.strategy, TokenStrategy::ClientCredentials);
        assert_eq!(spotify.timeout, Duration::from_secs(10));
    }

    #[test]
    fn sync_output_defaults_to_lyrics_txt() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();

        let config =
            Config::from_args(args(spotify_args(), Command::Sync(sync_args(root.clone())))).unwrap();

        let Mode::Sync { sync, .. } = config.mode else {
            panic!("expected sync mode");
        };
        assert_eq!(sync.output, root.join("lyrics.txt"));
        assert_eq!(sync.summary_json, None);
    }

    #[test]
    fn missing_root_yields_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");

        let error =
            Config::from_args(args(spotify_args(), Command::Scan(scan_args(Some(missing.clone())))))
                .unwrap_err();
        let message = format!("{error:#}");
        assert!(
            message.contains(missing.to_string_lossy().as_ref()),
            "unexpected error message: {message}"
        );
    }

    #[test]
    fn lookup_requires_client_id() {
        let mut spotify = spotify_args();
        spotify.client_id = Some("  ".into());

        let error = Config::from_args(args(
            spotify,
            Command::Lookup(LookupArgs {
                title: "Song".into(),
                artist: None,
            }),
        ))
        .unwrap_err();

        assert!(format!("{error:#}").contains("SPOTIFY_CLIENT_ID"));
    }

    #[test]
    fn refresh_grant_requires_refresh_token() {
        let mut spotify = spotify_args();
        spotify.token_strategy = TokenGrant::RefreshToken;
        let lookup = || {
            Command::Lookup(LookupArgs {
                title: "Song".into(),
                artist: Some("Band".into()),
            })
        };

        let error = Config::from_args(args(spotify.clone(), lookup())).unwrap_err();
        assert!(format!("{error:#}").contains("SPOTIFY_REFRESH_TOKEN"));

        spotify.refresh_token = Some("r-1".into());
        let config = Config::from_args(args(spotify, lookup())).unwrap();
        let Mode::Lookup { query, spotify } = config.mode else {
            panic!("expected lookup mode");
        };
        assert_eq!(query, TrackQuery::new("Song", Some("Band".into())));
        assert_eq!(spotify.strategy, TokenStrategy::RefreshToken("r-1".into()));
    }
}
