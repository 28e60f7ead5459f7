// Library exports for the snake simulation engine
// The headless runner and the replay tool both build on these modules

pub mod autopilot;
pub mod board;
pub mod chain;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod replay;
pub mod types;
