pub mod difficulty;
pub mod gameplay;
pub mod judgment;
pub mod lanes;
pub mod parsing;
pub mod scores;
pub mod scroll;
pub mod settings;
pub mod timing;
