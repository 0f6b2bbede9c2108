use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Lrc,
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum TokenGrant {
    ClientCredentials,
    RefreshToken,
}

/// Command-line options for lyricmatch.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Match local music files against Spotify and fetch synced lyrics as LRC."
)]
pub struct CliArgs {
    #[command(flatten)]
    pub spotify: SpotifyArgs,

    /// Reduce log verbosity to errors only.
    #[arg(long, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the local songs found under the library root.
    Scan(ScanArgs),
    /// Resolve every local song on Spotify and write its lyrics.
    Sync(SyncArgs),
    /// Resolve a single song and print the match with its lyrics.
    Lookup(LookupArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SpotifyArgs {
    /// Spotify application client id.
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Spotify application client secret.
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Refresh token used by the refresh-token grant.
    #[arg(long, global = true, env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// How the access token is obtained.
    #[arg(long, global = true, value_enum, default_value = "client-credentials")]
    pub token_strategy: TokenGrant,

    /// Token endpoint.
    #[arg(long, global = true, default_value = crate::spotify::DEFAULT_TOKEN_URL)]
    pub token_url: String,

    /// Web API base URL.
    #[arg(long, global = true, default_value = crate::spotify::DEFAULT_API_URL)]
    pub api_url: String,

    /// Lyrics API base URL.
    #[arg(long, global = true, default_value = crate::lyrics::DEFAULT_LYRICS_URL)]
    pub lyrics_url: String,

    /// ISO 3166-1 alpha-2 market used to filter search results.
    #[arg(long, global = true)]
    pub market: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Library root to scan; defaults to current working directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Comma-separated list of file extensions to scan (case-insensitive).
    #[arg(long, default_value = "mp3")]
    pub extensions: String,

    /// Case-insensitive substring to look for within the artist name.
    #[arg(long, default_value = "")]
    pub artist_filter: String,

    /// Limit recursion depth when scanning (0 means root only).
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Follow directory symlinks while scanning.
    #[arg(long, default_value_t = false)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// How lyrics are written: sidecar .lrc files, or appended to --output.
    #[arg(long, value_enum, default_value = "lrc")]
    pub format: OutputFormat,

    /// Output file for the text and json formats; defaults to lyrics.txt under the root.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Replace sidecar .lrc files that already exist.
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Resolve songs without writing anything.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Write a JSON summary report to the specified file.
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    /// Track title to search for.
    #[arg(long)]
    pub title: String,

    /// Artist name to narrow the search.
    #[arg(long)]
    pub artist: Option<String>,
}

impl CliArgs {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
