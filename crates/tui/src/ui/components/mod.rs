pub mod common;
pub mod component;
pub mod hint_bar;
pub mod launch;
pub mod task;

pub use launch::LaunchComponent;
pub use task::TaskComponent;
