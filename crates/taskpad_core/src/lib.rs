pub mod config;
pub mod controller;
pub mod error;
pub mod ids;
pub mod model;

pub use controller::{EmptyEditPolicy, Submitted, TaskListController};
