use std::{fs::File, io::BufReader, path::PathBuf};

use clap::{Parser, Subcommand};
use gesture_tree_core::{
    read_all, run_headless, spawn_detector, AppConfig, DetectorCommand, ReplayDetector, Session,
    SubprocessDetector,
};
use tracing_subscriber::EnvFilter;

mod window;

fn main() -> gesture_tree_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::default();

    match cli.command {
        Commands::Live {
            detector,
            detector_arg,
        } => run_live(&config, detector, detector_arg),
        Commands::Replay { input } => run_replay(&config, &input),
        Commands::Headless { input, frames, fps } => run_headless_file(&config, &input, frames, fps),
        Commands::Constants => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn run_live(
    config: &AppConfig,
    program: Option<PathBuf>,
    args: Vec<String>,
) -> gesture_tree_core::Result<()> {
    let command = match program {
        Some(program) => DetectorCommand { program, args },
        None => DetectorCommand::default(),
    };
    tracing::info!(?command, "starting live mode");

    let detector_config = config.detector.clone();
    let detector =
        match spawn_detector(move || SubprocessDetector::spawn(&command, &detector_config)) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(%err, "failed to start detector thread, running without interaction");
                None
            }
        };

    window::run(Session::new(config), detector)
}

fn run_replay(config: &AppConfig, input: &PathBuf) -> gesture_tree_core::Result<()> {
    tracing::info!(?input, "replaying recorded landmarks");
    let replay = ReplayDetector::open(input, true)?;
    let detector = spawn_detector(move || Ok(replay))?;
    window::run(Session::new(config), Some(detector))
}

fn run_headless_file(
    config: &AppConfig,
    input: &PathBuf,
    frames: u32,
    fps: f32,
) -> gesture_tree_core::Result<()> {
    tracing::info!(?input, frames, fps, "running headless session");
    let results = read_all(BufReader::new(File::open(input)?))?;
    let mut session = Session::new(config);
    let summary = run_headless(&mut session, results, frames, fps);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hand-gesture controlled particle tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the display driven by the webcam hand detector.
    Live {
        /// Detector program to launch instead of the bundled MediaPipe script.
        #[arg(long)]
        detector: Option<PathBuf>,
        /// Extra argument passed to the detector program; repeatable.
        #[arg(long = "detector-arg", allow_hyphen_values = true)]
        detector_arg: Vec<String>,
    },
    /// Open the display driven by a recorded JSON-lines landmark file.
    Replay {
        /// Path to the recording.
        input: PathBuf,
    },
    /// Run a recording without a window and print the end-of-run summary.
    Headless {
        /// Path to the recording.
        input: PathBuf,
        /// Number of render frames to simulate.
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// Simulated display refresh rate.
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
    },
    /// Print the built-in constants as JSON.
    Constants,
}
