use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::model::Task;
use crate::store::{StoreChange, TaskStore};

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// Blank input: keep the current store contents.
    NotRequested,
    Replaced { count: usize, change: StoreChange },
}

/// Replace the store wholesale with the tasks in `raw`, unless `raw` is blank.
///
/// Parsed records are trusted as-is; ids are not checked for uniqueness and loosely
/// typed fields are coerced rather than rejected. Only text that is not a JSON array
/// of objects fails with [`CoreError::Format`].
pub fn import_tasks(store: &mut TaskStore, raw: &str) -> Result<ImportOutcome> {
    if raw.trim().is_empty() {
        return Ok(ImportOutcome::NotRequested);
    }
    let tasks = parse_tasks(raw)?;
    let count = tasks.len();
    let change = store.replace(tasks);
    tracing::info!(count, "imported tasks");
    Ok(ImportOutcome::Replaced { count, change })
}

pub fn parse_tasks(raw: &str) -> Result<Vec<Task>> {
    serde_json::from_str(raw.trim()).map_err(CoreError::Format)
}

pub fn export_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).map_err(CoreError::Export)
}

/// Read import text from a file, or from stdin when `path` is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    let display = path.display().to_string();
    let io_error = |source| CoreError::Io {
        path: display.clone(),
        source,
    };
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(io_error)?;
        return Ok(buffer);
    }
    fs::read_to_string(path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: "1".into(),
                title: "Write report".into(),
                due_date: Some("2025-11-30".into()),
                estimated_hours: 2.0,
                importance: 8,
                dependencies: vec![],
            },
            Task {
                id: "2".into(),
                title: "Review report".into(),
                due_date: None,
                estimated_hours: 0.5,
                importance: 6,
                dependencies: vec!["1".into()],
            },
        ]
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    fn blank_text_is_not_an_import(#[case] raw: &str) {
        let mut store = TaskStore::with_tasks(sample_tasks());
        let outcome = import_tasks(&mut store, raw).unwrap();
        assert_eq!(outcome, ImportOutcome::NotRequested);
        assert_eq!(store.len(), 2);
        assert_eq!(store.revision(), 0);
    }

    #[rstest]
    #[case("not json")]
    #[case("{\"title\": \"object, not array\"}")]
    #[case("[1, 2]")]
    #[case("[{\"title\": \"ok\"}, \"stray\"]")]
    fn malformed_text_leaves_store_untouched(#[case] raw: &str) {
        let mut store = TaskStore::with_tasks(sample_tasks());
        let err = import_tasks(&mut store, raw).unwrap_err();
        assert!(matches!(err, CoreError::Format(_)));
        assert_eq!(store.tasks(), sample_tasks().as_slice());
    }

    #[test]
    fn export_then_import_round_trips() {
        let exported = export_tasks(&sample_tasks()).unwrap();
        let mut store = TaskStore::with_tasks(vec![Task::new("will be replaced")]);

        let outcome = import_tasks(&mut store, &exported).unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Replaced {
                count: 2,
                change: StoreChange::Replaced { len: 2 },
            }
        );
        assert_eq!(store.tasks(), sample_tasks().as_slice());
    }

    #[test]
    fn numeric_ids_and_dependencies_are_imported() {
        let raw = r#"[
            {"id": 1, "title": "Write report", "due_date": "2025-11-30", "estimated_hours": "2", "importance": 8, "dependencies": []},
            {"id": 2, "title": "Review report", "dependencies": [1]}
        ]"#;
        let mut store = TaskStore::with_tasks(vec![Task::new("keep")]);

        let outcome = import_tasks(&mut store, raw).unwrap();

        assert!(matches!(outcome, ImportOutcome::Replaced { count: 2, .. }));
        assert_eq!(store.tasks()[0].id, "1");
        assert_eq!(store.tasks()[0].estimated_hours, 2.0);
        assert_eq!(store.tasks()[1].id, "2");
        assert_eq!(store.tasks()[1].dependencies, vec!["1".to_string()]);
    }

    #[test]
    fn record_without_title_is_imported_untitled() {
        let mut store = TaskStore::new();
        import_tasks(&mut store, r#"[{"id": "missing title"}]"#).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title, "");
    }

    #[test]
    fn duplicate_ids_are_accepted() {
        let raw = r#"[{"id": "a", "title": "one"}, {"id": "a", "title": "two"}]"#;
        let mut store = TaskStore::new();
        import_tasks(&mut store, raw).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn reads_source_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "[]").unwrap();
        assert_eq!(read_source(&path).unwrap(), "[]");

        let missing = dir.path().join("missing.json");
        assert!(matches!(read_source(&missing), Err(CoreError::Io { .. })));
    }
}
