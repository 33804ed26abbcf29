//! Loads a room mesh and prints a JSON summary of its surfaces.
//!
//! Usage:
//! ```text
//! roomstudio                                  # resources/room.stl
//! roomstudio path/to/room.stl
//! roomstudio path/to/room.stl --config studio.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use roomstudio::config::StudioConfig;
use roomstudio::room::RoomModel;
use tracing::error;

const DEFAULT_MESH_PATH: &str = "resources/room.stl";
const USAGE: &str = "usage: roomstudio [MESH_PATH] [--config FILE]";

struct Args {
    mesh: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut mesh = None;
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" | "--config" => {
                let file = args.next().ok_or("--config needs a file")?;
                config = Some(PathBuf::from(file));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option `{flag}`")),
            path if mesh.is_none() => mesh = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument `{extra}`")),
        }
    }
    Ok(Some(Args {
        mesh: mesh.unwrap_or_else(|| PathBuf::from(DEFAULT_MESH_PATH)),
        config,
    }))
}

fn run(args: &Args) -> roomstudio::Result<String> {
    let config = match &args.config {
        Some(path) => StudioConfig::from_path(path)?,
        None => StudioConfig::default(),
    };
    let room = RoomModel::load(&args.mesh, &config)?;
    room.summary().to_json()
}

fn main() -> ExitCode {
    // Default: WARN for everything, INFO for roomstudio.
    // Override with RUST_LOG env var (e.g. RUST_LOG=roomstudio=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("roomstudio=info".parse().unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
