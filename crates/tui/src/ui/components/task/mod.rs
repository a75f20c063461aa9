mod ansi;
mod state;
mod task_component;

pub use state::{KillStatus, LogPane, TaskViewState};
pub use task_component::TaskComponent;
