use crate::error::{Error, Result};
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One row-source of a pattern. `rows[row][step]` is true when a note sits there.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub name: String,
    pub rows: Vec<Vec<bool>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub name: String,
    pub bpm: f64,
    pub length: u64,
    pub tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct RawPattern {
    #[serde(default)]
    name: String,
    bpm: f64,
    length: u64,
    tracks: Vec<RawTrack>,
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(default)]
    name: String,
    rows: Vec<String>,
}

fn parse_steps(raw: &str, length: u64, track: usize, row: usize) -> Result<Vec<bool>> {
    let bytes = raw.as_bytes();
    if bytes.len() as u64 != length {
        return Err(Error::Pattern(format!(
            "track {} row {} has {} steps, expected {}",
            track,
            row,
            bytes.len(),
            length
        )));
    }
    Ok(bytes
        .iter()
        .map(|&ch| matches!(ch, b'x' | b'X' | b'1'))
        .collect())
}

fn build(raw: RawPattern) -> Result<Pattern> {
    if raw.length == 0 {
        return Err(Error::Pattern("length must be at least 1".to_string()));
    }
    if !raw.bpm.is_finite() || raw.bpm <= 0.0 {
        return Err(Error::Pattern(format!("bpm {} must be positive", raw.bpm)));
    }

    let mut tracks = Vec::with_capacity(raw.tracks.len());
    for (track_index, raw_track) in raw.tracks.into_iter().enumerate() {
        let rows = raw_track
            .rows
            .iter()
            .enumerate()
            .map(|(row, steps)| parse_steps(steps, raw.length, track_index, row))
            .collect::<Result<Vec<_>>>()?;
        tracks.push(Track {
            name: raw_track.name,
            rows,
        });
    }

    let note_count: usize = tracks
        .iter()
        .flat_map(|t| t.rows.iter())
        .map(|r| r.iter().filter(|&&n| n).count())
        .sum();
    info!(
        "Parsed pattern '{}': {} track(s), {} notes per loop.",
        raw.name,
        tracks.len(),
        note_count
    );

    Ok(Pattern {
        name: raw.name,
        bpm: raw.bpm,
        length: raw.length,
        tracks,
    })
}

pub fn parse_pattern_str(json: &str) -> Result<Pattern> {
    let raw: RawPattern = serde_json::from_str(json).map_err(|source| Error::Json {
        path: "<inline>".into(),
        source,
    })?;
    build(raw)
}

pub fn load(path: &Path) -> Result<Pattern> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawPattern = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    build(raw)
}
