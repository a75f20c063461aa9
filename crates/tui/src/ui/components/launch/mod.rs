mod launch_component;
mod state;

pub use launch_component::LaunchComponent;
pub use state::{FocusTarget, LaunchState, Notice};
