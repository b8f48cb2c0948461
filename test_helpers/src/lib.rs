pub mod mirror;
pub mod recording;
