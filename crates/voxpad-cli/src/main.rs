//! CLI entry point and composition root.
//!
//! All wiring of engines, encoder, history, and HTTP server happens in
//! `voxpad_axum::bootstrap`; this binary only resolves configuration and
//! dispatches.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voxpad_axum::{ServerConfig, start_server};
use voxpad_cli::{Cli, Commands, ResolvedPaths, ServeArgs, paths};

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Locations checked for a frontend build when `--static-dir` is absent.
fn find_static_dir() -> Option<PathBuf> {
    let candidates = ["./web/dist", "./web", "./static"];
    candidates
        .iter()
        .map(Path::new)
        .find(|path| path.join("index.html").exists())
        .map(Path::to_path_buf)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => paths::data_root()?,
    };
    let tts_model_dir = match args.tts_model_dir {
        Some(dir) => dir,
        None => paths::tts_model_dir()?,
    };
    let stt_model = match args.stt_model {
        Some(path) => path,
        None => paths::stt_model_path()?,
    };

    let mut config = ServerConfig::new(&data_dir, tts_model_dir, stt_model);
    config.port = args.port;
    config.default_voice = args.voice;
    config.bitrate_kbps = args.bitrate;
    config.encoder_path = args.encoder;
    if !args.allow_origin.is_empty() {
        config = config.with_allowed_origins(args.allow_origin);
    }

    // Static dir resolution: api-only flag > explicit flag > default locations
    if !args.api_only {
        if let Some(dir) = args.static_dir {
            config.static_dir = Some(dir);
        } else {
            config.static_dir = find_static_dir();
        }
    }

    println!();
    println!("  voxpad server starting...");
    println!();
    if let Some(ref dir) = config.static_dir {
        println!("  Serving page from: {}", dir.display());
    } else {
        println!("  API only (use --static-dir to serve a frontend build)");
    }
    println!("  Data directory:    {}", data_dir.display());
    println!("  Local:             http://localhost:{}", config.port);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    start_server(config).await?;
    Ok(())
}

fn print_voices() {
    for voice in voxpad_voice::kokoro_voices() {
        let gender = match voice.gender {
            voxpad_voice::VoiceGender::Female => "female",
            voxpad_voice::VoiceGender::Male => "male",
        };
        println!("{:<12} {:<10} {:<8} {}", voice.id, voice.name, gender, voice.category);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve(args) => serve(args).await?,
        Commands::Paths => {
            let paths = ResolvedPaths::resolve()?;
            println!("{paths}");
        }
        Commands::Voices => print_voices(),
    }

    Ok(())
}
