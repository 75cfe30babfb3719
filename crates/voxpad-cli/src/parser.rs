//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the voxpad speech server.
#[derive(Parser)]
#[command(name = "voxpad")]
#[command(about = "Local text-to-speech and transcription server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from(["voxpad", "serve", "--port", "8080", "--voice", "bf_emma"]);
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.voice, "bf_emma");
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["voxpad", "serve"]);
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(args.port, 5757);
        assert_eq!(args.voice, "af_heart");
        assert_eq!(args.bitrate, 64);
        assert!(!args.api_only);
    }
}
