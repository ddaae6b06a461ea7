//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use crate::orb::ColorProfile;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  ponder-orb                          Gaze into the orb in this terminal
  ponder-orb --serve                  Serve the orb over telnet on 0.0.0.0:2222
  ponder-orb --serve --listen 127.0.0.1:4000
                                      Serve on another address
  telnet localhost 2222               Connect to a running server
  ponder-orb completions bash         Generate bash completions

ENVIRONMENT:
  PONDER_ENDPOINT      Answer service URL (default https://orb.ponder.guru/)
  PONDER_TRANSCRIPT    File receiving one line per question (default orb_log.txt)
  PONDER_LISTEN        Server listen address (default 0.0.0.0:2222)
  PONDER_TIMEOUT_SECS  Give up on the answer service after this many seconds
  PONDER_COLOR         truecolor or ansi256
";

/// Command-line arguments for the application.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A pondering orb for your terminal",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Serve one independent orb per telnet connection instead of running locally
    #[arg(long)]
    pub serve: bool,

    /// Address to listen on in server mode
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Answer service URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// File that receives each submitted question
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Seconds to wait for an answer before giving up (default: wait forever)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Color output (default: detected locally, truecolor for server sessions)
    #[arg(long, value_enum)]
    pub color: Option<ColorProfile>,

    /// Pin the starting animation frame instead of picking one at random
    #[arg(long, value_name = "FRAME")]
    pub start_frame: Option<u64>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_mode() {
        let args = Args::try_parse_from(["ponder-orb"]).expect("parse");
        assert!(!args.serve);
        assert!(args.command.is_none());
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn parses_server_flags() {
        let args = Args::try_parse_from([
            "ponder-orb",
            "--serve",
            "--listen",
            "127.0.0.1:4000",
            "--color",
            "ansi256",
            "--start-frame",
            "12",
            "-vv",
        ])
        .expect("parse");
        assert!(args.serve);
        assert_eq!(args.listen.as_deref(), Some("127.0.0.1:4000"));
        assert_eq!(args.color, Some(ColorProfile::Ansi256));
        assert_eq!(args.start_frame, Some(12));
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn quiet_wins_over_verbose() {
        let args = Args::try_parse_from(["ponder-orb", "-v", "-q"]).expect("parse");
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn completions_subcommand() {
        let args = Args::try_parse_from(["ponder-orb", "completions", "zsh"]).expect("parse");
        assert!(matches!(
            args.command,
            Some(Commands::Completions { shell: Shell::Zsh })
        ));
    }
}
