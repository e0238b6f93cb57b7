mod input_mode;
mod task;

pub use input_mode::InputMode;
pub use task::{Task, TaskId};
