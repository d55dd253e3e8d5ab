pub mod analyze;
pub mod capture;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod render;
pub mod store;

pub use analyze::{
    prepare_snapshot, spawn_analysis, AnalysisKind, AnalysisOutcome, AnalysisService,
    HttpAnalysisClient, PendingAnalysis,
};
pub use capture::{add_task, TaskInput};
pub use config::AppConfig;
pub use error::{CoreError, ServiceError};
pub use import::{export_tasks, import_tasks, ImportOutcome};
pub use model::*;
pub use render::{render, render_suggestions, ResultsView};
pub use store::{StoreChange, TaskStore};
