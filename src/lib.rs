pub mod config;
pub mod desktop;
pub mod error;
pub mod gate;
pub mod headless;
pub mod log;
pub mod shell;
pub mod tool;
pub mod workflow;

// Decoupled game loop architecture
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
