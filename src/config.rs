// Playfield
pub const SCREEN_SIZE: usize = 256;
pub const END_OF_TRACK: usize = SCREEN_SIZE - 1; // Leading slot, where objects spawn
pub const TILE_SIZE: usize = 20;
pub const HIT_LINE: usize = 20; // Slot the hit line sits on
pub const MAX_COLS: usize = 6;

// Timing
pub const TIME_SIG: u64 = 4; // Note indices per beat
pub const DEFAULT_TARGET_FPS: u32 = 60;

// Judgment windows, in slots. Exclusive upper bounds.
pub const PERFECT_DISTANCE: usize = 2;
pub const NICE_DISTANCE: usize = 10;
pub const GOOD_DISTANCE: usize = 20;

// Display countdowns
pub const N_ANIMATION_FRAMES: u32 = 40;
pub const BREATHING_FRAMES: u64 = 90;

// Scoring
pub const BASE_SCORE: u64 = 100;

// Start screen
pub const ATTRACT_SPEED: f64 = TILE_SIZE as f64 / 40.0;
pub const ATTRACT_SPAWN_FRAMES: u64 = 2 * TILE_SIZE as u64;
pub const MAX_START_DELAY_FRAMES: u64 = 30;

// Settings file
pub const SETTINGS_INI_PATH: &str = "save/rivesync.ini";
