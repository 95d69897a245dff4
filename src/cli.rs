use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Inspect tracking-curve state: load a snapshot and/or an image directory
/// into a fresh store and print what it holds
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Store snapshot (JSON) to load
    #[arg(short = 's', long = "snapshot", value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Background image directory to scan
    #[arg(short = 'i', long = "images", value_name = "DIR")]
    pub images: Option<PathBuf>,

    /// Move the frame cursor after loading (clamped to the frame range)
    #[arg(long = "frame", value_name = "N")]
    pub frame: Option<i32>,

    /// Make this curve active after loading
    #[arg(short = 'a', long = "active", value_name = "CURVE")]
    pub active: Option<String>,

    /// Print the resulting state as a JSON snapshot instead of a summary
    #[arg(long = "json")]
    pub json: bool,

    /// Enable debug logging to file (default: trackstore.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "trackstore", "-s", "shot.json", "--images", "/plates", "--frame", "12", "-a",
            "Track1", "-vv", "--json",
        ])
        .unwrap();
        assert_eq!(args.snapshot, Some(PathBuf::from("shot.json")));
        assert_eq!(args.images, Some(PathBuf::from("/plates")));
        assert_eq!(args.frame, Some(12));
        assert_eq!(args.active.as_deref(), Some("Track1"));
        assert_eq!(args.verbosity, 2);
        assert!(args.json);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_log_flag_without_value() {
        let args = Args::try_parse_from(["trackstore", "--log"]).unwrap();
        assert_eq!(args.log_file, Some(None));
    }
}
