pub mod logging;

pub use taskrank_tui::cli;
pub use taskrank_tui::commands;
pub use taskrank_tui::config;
pub use taskrank_tui::tui;
pub use taskrank_tui::AppConfig;

pub use taskrank_core as core;
pub use taskrank_core::analyze;
pub use taskrank_core::capture;
pub use taskrank_core::import;
pub use taskrank_core::model;
pub use taskrank_core::render;
pub use taskrank_core::store;
