use crate::model::TaskId;

/// State of the single input box.
///
/// The same buffer serves new-task text and pending edit text, so the two
/// uses are kept apart by the variant rather than by a separate flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Creating { buffer: String },
    Editing { task_id: TaskId, buffer: String },
}

impl Default for InputMode {
    fn default() -> Self {
        Self::Creating {
            buffer: String::new(),
        }
    }
}

impl InputMode {
    pub fn buffer(&self) -> &str {
        match self {
            Self::Creating { buffer } | Self::Editing { buffer, .. } => buffer,
        }
    }

    pub fn set_buffer(&mut self, text: String) {
        match self {
            Self::Creating { buffer } | Self::Editing { buffer, .. } => *buffer = text,
        }
    }

    pub fn editing_task_id(&self) -> Option<&TaskId> {
        match self {
            Self::Creating { .. } => None,
            Self::Editing { task_id, .. } => Some(task_id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Creating { .. } => "creating",
            Self::Editing { .. } => "editing",
        }
    }
}
