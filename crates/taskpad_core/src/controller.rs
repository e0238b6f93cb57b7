use crate::ids::{IdSource, UuidIdSource};
use crate::model::{InputMode, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// What `commit_edit` does when the pending text is empty.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyEditPolicy {
    /// Commit the empty text, unlike `add`.
    #[default]
    Accept,
    /// Leave the task and the edit session untouched.
    Ignore,
}

impl EmptyEditPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accept" | "allow" => Some(Self::Accept),
            "ignore" | "reject" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// Result of the shared add / confirm-edit trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Added(Task),
    Edited(Task),
    Ignored,
}

/// All state behind the single task list page.
///
/// Every transition is a silent no-op when it does not apply; return values
/// only tell the caller whether anything changed.
pub struct TaskListController {
    tasks: Vec<Task>,
    mode: InputMode,
    search_query: String,
    edit_policy: EmptyEditPolicy,
    ids: Box<dyn IdSource>,
}

impl Default for TaskListController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskListController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskListController")
            .field("tasks", &self.tasks)
            .field("mode", &self.mode)
            .field("search_query", &self.search_query)
            .field("edit_policy", &self.edit_policy)
            .finish_non_exhaustive()
    }
}

impl TaskListController {
    pub fn new() -> Self {
        Self::with_id_source(Box::new(UuidIdSource))
    }

    pub fn with_id_source(ids: Box<dyn IdSource>) -> Self {
        Self {
            tasks: Vec::new(),
            mode: InputMode::default(),
            search_query: String::new(),
            edit_policy: EmptyEditPolicy::default(),
            ids,
        }
    }

    pub fn with_edit_policy(mut self, policy: EmptyEditPolicy) -> Self {
        self.edit_policy = policy;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn input_buffer(&self) -> &str {
        self.mode.buffer()
    }

    pub fn is_editing(&self) -> bool {
        self.mode.is_editing()
    }

    pub fn editing_task_id(&self) -> Option<&TaskId> {
        self.mode.editing_task_id()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn edit_policy(&self) -> EmptyEditPolicy {
        self.edit_policy
    }

    pub fn set_input_buffer(&mut self, text: impl Into<String>) {
        self.mode.set_buffer(text.into());
    }

    /// Appends the buffer as a new task. Ignored while editing or when the
    /// buffer is empty.
    pub fn add(&mut self) -> Option<Task> {
        let buffer = match &mut self.mode {
            InputMode::Creating { buffer } => buffer,
            InputMode::Editing { task_id, .. } => {
                debug!(task_id = %task_id, "add ignored: edit session active");
                return None;
            }
        };

        if buffer.is_empty() {
            debug!("add ignored: input buffer empty");
            return None;
        }

        let task = Task::new(self.ids.next_id(), std::mem::take(buffer));
        debug!(task_id = %task.id, "task added");
        self.tasks.push(task.clone());
        Some(task)
    }

    /// The add / confirm-edit button: dispatches on the current mode.
    pub fn submit(&mut self) -> Submitted {
        let outcome = if self.mode.is_editing() {
            self.commit_edit().map(Submitted::Edited)
        } else {
            self.add().map(Submitted::Added)
        };
        outcome.unwrap_or(Submitted::Ignored)
    }

    /// Starts editing `id`, loading its text into the buffer. Replaces any
    /// session already open.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(task) = self.task(id) else {
            debug!(task_id = id, "begin_edit ignored: task not found");
            return false;
        };

        let editing = InputMode::Editing {
            task_id: task.id.clone(),
            buffer: task.text.clone(),
        };

        if let Some(previous) = self.mode.editing_task_id() {
            debug!(task_id = %previous, "edit session replaced");
        }
        self.mode = editing;
        debug!(task_id = id, "edit session started");
        true
    }

    pub fn commit_edit(&mut self) -> Option<Task> {
        let InputMode::Editing { task_id, buffer } = &self.mode else {
            debug!("commit_edit ignored: no edit session");
            return None;
        };

        if buffer.is_empty() && self.edit_policy == EmptyEditPolicy::Ignore {
            debug!(task_id = %task_id, "commit_edit ignored: empty text");
            return None;
        }

        let InputMode::Editing { task_id, buffer } = std::mem::take(&mut self.mode) else {
            return None;
        };

        // Deleting a task cancels its session, so the referent is present.
        let task = self.tasks.iter_mut().find(|task| task.id == task_id)?;
        task.text = buffer;
        debug!(task_id = %task_id, "edit committed");
        Some(task.clone())
    }

    pub fn cancel_edit(&mut self) -> bool {
        if !self.mode.is_editing() {
            return false;
        }
        if let InputMode::Editing { task_id, .. } = std::mem::take(&mut self.mode) {
            debug!(task_id = %task_id, "edit session cancelled");
        }
        true
    }

    pub fn toggle_complete(&mut self, id: &str) -> Option<Task> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(task_id = id, "toggle ignored: task not found");
            return None;
        };

        task.complete = !task.complete;
        debug!(task_id = id, complete = task.complete, "task toggled");
        Some(task.clone())
    }

    /// Removes `id`. An edit session on that task is cancelled with it.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!(task_id = id, "delete ignored: task not found");
            return None;
        };

        let removed = self.tasks.remove(index);
        if self.mode.editing_task_id() == Some(&removed.id) {
            debug!(task_id = id, "edit session cancelled: task deleted");
            self.mode = InputMode::default();
        }
        debug!(task_id = id, "task deleted");
        Some(removed)
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.matches(&self.search_query))
            .collect()
    }
}
