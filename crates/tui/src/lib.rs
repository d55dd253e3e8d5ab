pub mod cli;
pub mod commands;
pub mod config;
pub mod tui;

pub use taskrank_core as core;
pub use taskrank_core::model;

pub use taskrank_core::AppConfig;
