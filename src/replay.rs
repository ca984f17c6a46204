//! Headless driver: feeds a recorded input trace through the run frame by frame.

use crate::core::input::{self, Button, InputEdge, Lane};
use crate::error::{Error, Result};
use crate::game::gameplay::{self, Phase};
use crate::game::scores::RunSummary;
use crate::game::settings::Settings;
use crate::game::timing::BeatSource;
use log::{info, warn};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug)]
pub struct ReplayOptions {
    /// Hard stop for runs that never end on their own.
    pub max_frames: u64,
    /// Presses a lane on frame 0 so the trace does not have to.
    pub autostart: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            max_frames: 60 * 60 * 10,
            autostart: false,
        }
    }
}

/// Parses a JSON array of input edges, ordered by frame. Edges sharing a
/// frame keep their recorded order.
pub fn parse_trace_str(json: &str) -> Result<Vec<InputEdge>> {
    let mut edges: Vec<InputEdge> = serde_json::from_str(json).map_err(|source| Error::Json {
        path: "<inline>".into(),
        source,
    })?;
    edges.sort_by_key(|edge| edge.frame);
    Ok(edges)
}

pub fn load_trace(path: &Path) -> Result<Vec<InputEdge>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut edges: Vec<InputEdge> = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    edges.sort_by_key(|edge| edge.frame);
    info!("Loaded {} input edge(s) from '{}'.", edges.len(), path.display());
    Ok(edges)
}

/// Runs until the game-over screen would close or `max_frames` is hit, and
/// returns the last published summary.
pub fn run(
    settings: Settings,
    source: Option<Box<dyn BeatSource>>,
    edges: &[InputEdge],
    options: ReplayOptions,
) -> RunSummary {
    let mut state = gameplay::init(settings, source);
    let mut input = input::init_state();

    let mut timeline = Vec::with_capacity(edges.len() + 2);
    if options.autostart {
        timeline.push(InputEdge::press(0, Button::Lane(Lane::Left)));
        timeline.push(InputEdge::release(1, Button::Lane(Lane::Left)));
    }
    timeline.extend_from_slice(edges);
    timeline.sort_by_key(|edge| edge.frame);
    for edge in timeline {
        input.queue_edge(edge);
    }

    for frame in 0..options.max_frames {
        input.begin_frame(frame);
        gameplay::update(&mut state, frame, &input);
        if state.should_exit(frame) {
            break;
        }
    }

    if !matches!(state.phase(), Phase::Ended { .. }) {
        warn!(
            "Replay stopped after {} frames without the run ending ({:?}).",
            options.max_frames,
            state.phase()
        );
    }
    state.summary().clone()
}

pub fn write_outcard(path: &Path, summary: &RunSummary) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, summary.to_outcard() + "\n").map_err(io_err)?;
    info!("Wrote outcard to '{}'.", path.display());
    Ok(())
}
