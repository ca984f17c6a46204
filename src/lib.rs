pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod replay;

pub use error::{Error, Result};
