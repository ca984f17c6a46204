use clap::Parser;
use log::{error, info, LevelFilter};
use rivesync::config::SETTINGS_INI_PATH;
use rivesync::game::parsing::pattern;
use rivesync::game::settings;
use rivesync::game::timing::{BeatSource, PatternSource};
use rivesync::replay::{self, ReplayOptions};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file. Created with defaults when missing.
    #[arg(short, long, default_value = SETTINGS_INI_PATH)]
    config: PathBuf,

    /// Step pattern JSON. Without one the run ends as soon as it starts.
    #[arg(short, long)]
    pattern: Option<PathBuf>,

    /// Input trace JSON: an array of timestamped press/release edges.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Press a lane on frame 0 instead of waiting for the trace to start the run.
    #[arg(long, default_value_t = false)]
    autostart: bool,

    #[arg(long, default_value_t = ReplayOptions::default().max_frames)]
    max_frames: u64,

    /// Where to write the final `JSON{...}` report. Printed to stdout when absent.
    #[arg(short, long)]
    outcard: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let (default_level, judgment_level) = if cli.debug {
        (LevelFilter::Debug, LevelFilter::Info)
    } else {
        (LevelFilter::Info, LevelFilter::Warn) // Per-press JUDGED lines only with --debug
    };
    env_logger::Builder::from_default_env()
        .filter_level(default_level)
        .filter_module("rivesync::game::judgment", judgment_level)
        .filter_module("rivesync::game::parsing", LevelFilter::Debug)
        .init();

    info!("rivesync starting...");

    let settings = settings::load(&cli.config);

    let source: Option<Box<dyn BeatSource>> = match &cli.pattern {
        Some(path) => match pattern::load(path) {
            Ok(p) => Some(Box::new(PatternSource::new(p, settings.loops, settings.target_fps))),
            Err(e) => {
                error!("Failed to load pattern: {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    let edges = match &cli.trace {
        Some(path) => replay::load_trace(path).unwrap_or_else(|e| {
            error!("Failed to load input trace: {}", e);
            process::exit(1);
        }),
        None => Vec::new(),
    };

    let options = ReplayOptions {
        max_frames: cli.max_frames,
        autostart: cli.autostart,
    };
    let summary = replay::run(settings, source, &edges, options);

    match &cli.outcard {
        Some(path) => {
            if let Err(e) = replay::write_outcard(path, &summary) {
                error!("{}", e);
                process::exit(1);
            }
        }
        None => println!("{}", summary.to_outcard()),
    }

    info!("rivesync exited gracefully.");
}
