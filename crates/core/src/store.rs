use crate::error::{CoreError, Result};
use crate::model::Task;

/// Signal returned by every [`TaskStore`] mutation.
///
/// Hosts redraw the full task listing whenever they receive one.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Appended { index: usize },
    Removed { index: usize, task: Task },
    Replaced { len: usize },
    Cleared { removed: usize },
}

impl StoreChange {
    pub fn describe(&self) -> String {
        match self {
            StoreChange::Appended { index } => format!("Added task #{}", index + 1),
            StoreChange::Removed { task, .. } => format!("Removed \"{}\"", task.title),
            StoreChange::Replaced { len } => {
                format!("Imported {} task{}", len, if *len == 1 { "" } else { "s" })
            }
            StoreChange::Cleared { removed } => format!(
                "Cleared {} task{}",
                removed,
                if *removed == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Ordered, exclusively owned collection of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    revision: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks, revision: 0 }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Incremented on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Copy of the current sequence, insulated from later mutations.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn append(&mut self, task: Task) -> StoreChange {
        self.tasks.push(task);
        let index = self.tasks.len() - 1;
        self.bump();
        tracing::debug!(index, len = self.tasks.len(), "task appended");
        StoreChange::Appended { index }
    }

    /// Delete the task at `index`; later tasks shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<StoreChange> {
        if index >= self.tasks.len() {
            return Err(CoreError::PositionOutOfRange {
                index,
                len: self.tasks.len(),
            });
        }
        let task = self.tasks.remove(index);
        self.bump();
        tracing::debug!(index, task_id = task.id.as_str(), "task removed");
        Ok(StoreChange::Removed { index, task })
    }

    pub fn replace(&mut self, tasks: Vec<Task>) -> StoreChange {
        self.tasks = tasks;
        self.bump();
        tracing::debug!(len = self.tasks.len(), "task list replaced");
        StoreChange::Replaced {
            len: self.tasks.len(),
        }
    }

    pub fn clear(&mut self) -> StoreChange {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.bump();
        tracing::debug!(removed, "task list cleared");
        StoreChange::Cleared { removed }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
