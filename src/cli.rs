use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "youtube-music-control")]
#[command(version, about = "Remote control client for th-ch/youtube-music", long_about = None)]
pub struct Cli {
    /// Server base URL [default: http://localhost:26538]
    #[arg(short, long, env = "YOUTUBE_MUSIC_SERVER")]
    pub server: Option<String>,

    /// API path [default: /api/v1]
    #[arg(long, env = "YOUTUBE_MUSIC_API")]
    pub api: Option<String>,

    /// Username for authentication [default: youtube-music-control]
    #[arg(short, long, env = "YOUTUBE_MUSIC_USER")]
    pub user: Option<String>,

    /// Config file [default: ~/.config/youtube-music-control/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use PATCH method
    #[arg(long, conflicts_with = "delete")]
    pub patch: bool,

    /// Use DELETE method
    #[arg(long)]
    pub delete: bool,

    /// List available API endpoints
    #[arg(short, long)]
    pub list: bool,

    /// Print request details
    #[arg(short, long)]
    pub verbose: bool,

    /// API endpoint to call
    pub endpoint: Option<String>,

    /// Request data: JSON or a single value
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_endpoint_and_data() {
        let cli = Cli::try_parse_from(["youtube-music-control", "-v", "volume", "50"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.endpoint.as_deref(), Some("volume"));
        assert_eq!(cli.data.as_deref(), Some("50"));
    }

    #[test]
    fn patch_and_delete_conflict() {
        let err = Cli::try_parse_from(["youtube-music-control", "--patch", "--delete", "queue/1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
