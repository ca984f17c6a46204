use crate::config::{DEFAULT_TARGET_FPS, MAX_COLS};
use crate::error::{Error, Result};
use crate::game::scores::ScoreMultipliers;
use configparser::ini::Ini;
use log::{info, warn};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Run configuration. Read once before the first frame and never changed after.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub n_cols: usize,
    pub initial_speed: f64,
    pub speed_multiplier: f64,
    pub speed_increase_interval: u32,
    pub notes_interval: u32,
    pub notes_increase_interval: u32,
    pub focus_track: usize,
    /// Successor of each track, indexed by track.
    pub track_next: Vec<usize>,
    /// Change interval of each track, indexed by track. Missing entries are 0.
    pub track_change_interval: Vec<u32>,
    pub multipliers: ScoreMultipliers,
    pub max_misses: u32,
    pub loops: u32,
    pub show_stats: bool,
    pub frame_offset: i64,
    pub target_fps: u32,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            n_cols: 4,
            initial_speed: 2.0,
            speed_multiplier: 1.15,
            speed_increase_interval: 16,
            notes_interval: 2,
            notes_increase_interval: 32,
            focus_track: 0,
            track_next: Vec::new(),
            track_change_interval: Vec::new(),
            multipliers: ScoreMultipliers::default(),
            max_misses: 5,
            loops: 4,
            show_stats: true,
            frame_offset: 0,
            target_fps: DEFAULT_TARGET_FPS,
            seed: 0,
        }
    }
}

fn read<T>(conf: &Ini, section: &str, key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match conf.get(section, key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "[{}] {} = '{}' is not valid, using {}.",
                    section, key, raw, default
                );
                default
            }
        },
    }
}

fn read_bool(conf: &Ini, section: &str, key: &str, default: bool) -> bool {
    match conf.get(section, key).as_deref().map(str::trim) {
        None => default,
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        Some(other) => {
            warn!("[{}] {} = '{}' is not a boolean, using {}.", section, key, other, default);
            default
        }
    }
}

fn read_list<T: FromStr>(conf: &Ini, section: &str, key: &str) -> Vec<T> {
    let Some(raw) = conf.get(section, key) else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|item| match item.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("[{}] {}: skipping invalid entry '{}'.", section, key, item);
                None
            }
        })
        .collect()
}

fn clamped<T: PartialOrd + Display + Copy>(name: &str, value: T, min: T, max: T) -> T {
    if value < min {
        warn!("{} = {} below {}, clamping.", name, value, min);
        min
    } else if value > max {
        warn!("{} = {} above {}, clamping.", name, value, max);
        max
    } else {
        value
    }
}

fn positive(name: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("{} = {} must be positive, using {}.", name, value, default);
        default
    }
}

impl Settings {
    pub fn from_ini(conf: &Ini) -> Self {
        let d = Settings::default();

        Self {
            n_cols: read(conf, "lanes", "count", d.n_cols),
            initial_speed: read(conf, "speed", "initial", d.initial_speed),
            speed_multiplier: read(conf, "speed", "multiplier", d.speed_multiplier),
            speed_increase_interval: read(conf, "speed", "increase_interval", d.speed_increase_interval),
            notes_interval: read(conf, "notes", "interval", d.notes_interval),
            notes_increase_interval: read(conf, "notes", "increase_interval", d.notes_increase_interval),
            focus_track: read(conf, "tracks", "focus", d.focus_track),
            track_next: read_list(conf, "tracks", "next"),
            track_change_interval: read_list(conf, "tracks", "change_interval"),
            multipliers: ScoreMultipliers {
                perfect: read(conf, "scoring", "perfect", d.multipliers.perfect),
                nice: read(conf, "scoring", "nice", d.multipliers.nice),
                good: read(conf, "scoring", "good", d.multipliers.good),
            },
            max_misses: read(conf, "scoring", "max_misses", d.max_misses),
            loops: read(conf, "run", "loops", d.loops),
            show_stats: read_bool(conf, "run", "show_stats", d.show_stats),
            frame_offset: read(conf, "run", "frame_offset", d.frame_offset),
            target_fps: read(conf, "run", "target_fps", d.target_fps),
            seed: read(conf, "run", "seed", d.seed),
        }
        .normalized()
    }

    /// Pulls every value into the range the gameplay core can run with.
    /// Settings built in code go through here too, not only those read from a file.
    pub fn normalized(self) -> Self {
        let d = Settings::default();
        Self {
            n_cols: clamped("lanes.count", self.n_cols, 1, MAX_COLS),
            initial_speed: positive("speed.initial", self.initial_speed, d.initial_speed),
            // Speed only ever escalates.
            speed_multiplier: clamped(
                "speed.multiplier",
                positive("speed.multiplier", self.speed_multiplier, d.speed_multiplier),
                1.0,
                f64::INFINITY,
            ),
            notes_interval: clamped("notes.interval", self.notes_interval, 1, 4),
            multipliers: ScoreMultipliers {
                perfect: self.multipliers.perfect.max(0.0),
                nice: self.multipliers.nice.max(0.0),
                good: self.multipliers.good.max(0.0),
            },
            target_fps: self.target_fps.max(1),
            ..self
        }
    }

    pub fn from_ini_str(text: &str) -> Self {
        let mut conf = Ini::new();
        if let Err(e) = conf.read(text.to_string()) {
            warn!("Failed to parse settings, using defaults: {}", e);
            return Settings::default();
        }
        Self::from_ini(&conf)
    }
}

/// Writes a settings file holding the defaults.
pub fn write_defaults(path: &Path) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let d = Settings::default();
    let mut conf = Ini::new();
    conf.set("lanes", "count", Some(d.n_cols.to_string()));
    conf.set("speed", "initial", Some(d.initial_speed.to_string()));
    conf.set("speed", "multiplier", Some(d.speed_multiplier.to_string()));
    conf.set("speed", "increase_interval", Some(d.speed_increase_interval.to_string()));
    conf.set("notes", "interval", Some(d.notes_interval.to_string()));
    conf.set("notes", "increase_interval", Some(d.notes_increase_interval.to_string()));
    conf.set("tracks", "focus", Some(d.focus_track.to_string()));
    conf.set("tracks", "next", Some(String::new()));
    conf.set("tracks", "change_interval", Some(String::new()));
    conf.set("scoring", "perfect", Some(d.multipliers.perfect.to_string()));
    conf.set("scoring", "nice", Some(d.multipliers.nice.to_string()));
    conf.set("scoring", "good", Some(d.multipliers.good.to_string()));
    conf.set("scoring", "max_misses", Some(d.max_misses.to_string()));
    conf.set("run", "loops", Some(d.loops.to_string()));
    conf.set("run", "show_stats", Some(d.show_stats.to_string()));
    conf.set("run", "frame_offset", Some(d.frame_offset.to_string()));
    conf.set("run", "target_fps", Some(d.target_fps.to_string()));
    conf.set("run", "seed", Some(d.seed.to_string()));
    conf.write(path).map_err(io_err)
}

/// Loads settings from `path`, creating a defaults file first when it is missing.
/// Never fails: anything unreadable falls back to the defaults.
pub fn load(path: &Path) -> Settings {
    if !path.exists() {
        info!("Settings file not found, creating defaults in '{}'.", path.display());
        if let Err(e) = write_defaults(path) {
            warn!("Failed to create default settings: {}", e);
            return Settings::default();
        }
    }

    let mut conf = Ini::new();
    match conf.load(path) {
        Ok(_) => {
            let settings = Settings::from_ini(&conf);
            info!("Loaded settings from '{}': {:?}", path.display(), settings);
            settings
        }
        Err(e) => {
            warn!("Failed to load '{}', using defaults: {}", path.display(), e);
            Settings::default()
        }
    }
}
