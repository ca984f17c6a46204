use rivesync::Error;
use rivesync::game::parsing::pattern;
use rivesync::game::settings::{self, Settings};
use rivesync::game::timing::PatternSource;
use rivesync::replay::{self, ReplayOptions};
use std::fs;
use tempfile::TempDir;

mod common;

struct TestContext {
    dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("busy.json"), common::BUSY_PATTERN).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, text: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }
}

#[test]
fn missing_settings_file_is_created_with_defaults() {
    let ctx = TestContext::new();
    let path = ctx.dir.path().join("save").join("rivesync.ini");

    let loaded = settings::load(&path);
    assert_eq!(loaded, Settings::default());
    assert!(path.exists());

    // The written file reads back to the same values.
    assert_eq!(settings::load(&path), Settings::default());
}

#[test]
fn settings_file_overrides_defaults() {
    let ctx = TestContext::new();
    let path = ctx.write(
        "custom.ini",
        "[lanes]\ncount = 3\n[scoring]\nmax_misses = 9\n[run]\nseed = 7\n",
    );
    let loaded = settings::load(&path);
    assert_eq!(loaded.n_cols, 3);
    assert_eq!(loaded.max_misses, 9);
    assert_eq!(loaded.seed, 7);
    assert_eq!(loaded.initial_speed, Settings::default().initial_speed);
}

#[test]
fn load_errors_carry_their_kind() {
    let ctx = TestContext::new();
    let missing = pattern::load(&ctx.dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, Error::Io { .. }));

    let broken = ctx.write("broken.json", "[ { \"frame\": 1, ");
    assert!(matches!(replay::load_trace(&broken), Err(Error::Json { .. })));

    let ragged = ctx.write(
        "ragged.json",
        r#"{ "bpm": 100, "length": 4, "tracks": [ { "rows": ["x."] } ] }"#,
    );
    assert!(matches!(pattern::load(&ragged), Err(Error::Pattern(_))));
}

#[test]
fn quit_trace_round_trips_through_files() {
    let ctx = TestContext::new();
    let trace = ctx.write(
        "trace.json",
        r#"[ { "frame": 0, "button": { "lane": "up" }, "pressed": true },
             { "frame": 1, "button": { "lane": "up" }, "pressed": false },
             { "frame": 200, "button": "quit", "pressed": true } ]"#,
    );

    let settings = Settings {
        max_misses: 0,
        loops: 0,
        ..Settings::default()
    };
    let pattern = pattern::load(&ctx.dir.path().join("busy.json")).unwrap();
    let source = PatternSource::new(pattern, settings.loops, settings.target_fps);
    let edges = replay::load_trace(&trace).unwrap();
    let summary = replay::run(settings, Some(Box::new(source)), &edges, ReplayOptions::default());

    assert_eq!(summary.end_code, Some(1));
    assert_eq!(summary.frame, 200);
    assert!(summary.n_miss > 0);

    let outcard = ctx.dir.path().join("out").join("card.txt");
    replay::write_outcard(&outcard, &summary).unwrap();
    let text = fs::read_to_string(&outcard).unwrap();
    assert!(text.starts_with("JSON{\"frame\":200,"));
    assert!(text.contains("\"end_reason\":\"quit\""));
    assert!(text.ends_with("}\n"));
}
