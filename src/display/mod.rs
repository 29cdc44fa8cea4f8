//! Display surface for counselor output
//!
//! The coordinator talks to the surface only through [`DisplaySurface`];
//! the terminal renderer is one implementation.

mod markup;
mod terminal;

pub use markup::{Palette, StyledText};
#[cfg(test)]
pub use markup::Segment;
pub use terminal::TerminalDisplay;

/// Output side of a counselor session
pub trait DisplaySurface {
    /// Show the transient "thinking" indicator
    fn show_pending(&mut self);
    /// Replace the answer area with `text`
    fn show_text(&mut self, text: &StyledText);
    /// Toggle the page-level angry presentation
    fn set_angry_mode(&mut self, on: bool);
    /// Enable or disable submissions
    fn set_input_enabled(&mut self, enabled: bool);
    /// Empty the input field
    fn clear_input(&mut self);
    /// Move focus back to the input field
    fn focus_input(&mut self);
}

#[cfg(test)]
pub mod testing {
    use std::sync::{Arc, Mutex};

    use super::{DisplaySurface, StyledText};

    /// One call made on the surface
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DisplayOp {
        Pending,
        Text(StyledText),
        AngryMode(bool),
        InputEnabled(bool),
        ClearInput,
        Focus,
    }

    /// Records every call for assertions; clones share the log
    #[derive(Debug, Clone, Default)]
    pub struct RecordingDisplay {
        ops: Arc<Mutex<Vec<DisplayOp>>>,
    }

    impl RecordingDisplay {
        pub fn ops(&self) -> Vec<DisplayOp> {
            self.ops.lock().unwrap().clone()
        }

        pub fn take(&self) -> Vec<DisplayOp> {
            std::mem::take(&mut *self.ops.lock().unwrap())
        }

        fn push(&self, op: DisplayOp) {
            self.ops.lock().unwrap().push(op);
        }
    }

    impl DisplaySurface for RecordingDisplay {
        fn show_pending(&mut self) {
            self.push(DisplayOp::Pending);
        }

        fn show_text(&mut self, text: &StyledText) {
            self.push(DisplayOp::Text(text.clone()));
        }

        fn set_angry_mode(&mut self, on: bool) {
            self.push(DisplayOp::AngryMode(on));
        }

        fn set_input_enabled(&mut self, enabled: bool) {
            self.push(DisplayOp::InputEnabled(enabled));
        }

        fn clear_input(&mut self) {
            self.push(DisplayOp::ClearInput);
        }

        fn focus_input(&mut self) {
            self.push(DisplayOp::Focus);
        }
    }
}
