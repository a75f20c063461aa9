//! Component system for the launcher UI.
//!
//! Components own local view concerns (scroll offsets, layout) and render
//! themselves from [`App`]. They report side effects as [`Effect`]s instead
//! of performing I/O.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Effect};

pub(crate) trait Component {
    /// Handle a key while this component is on screen.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Key bindings to advertise in the hint bar, as `(keys, action)` pairs.
    fn hints(&self, _app: &App) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Draw into `rect`. Rendering must not change application state.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
