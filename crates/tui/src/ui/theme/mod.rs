//! Theme styling for the launcher UI.
//!
//! One palette (Nord) mapped onto semantic roles, plus helper builders for
//! Ratatui blocks, inputs and buttons. Prefer these helpers over hard-coded
//! colors.

pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use nord::NordTheme;
pub use roles::{Theme, ThemeRoles};
