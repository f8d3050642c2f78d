//! The single top-level screen state: story content, error display or empty placeholder.

use shared::error::ErrorDetails;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Content,
    Error(ErrorDetails),
    Empty,
}

impl ScreenState {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Content => "sb-show-main",
            Self::Error(_) => "sb-show-errordisplay",
            Self::Empty => "sb-show-nopreview",
        }
    }
}

#[derive(Debug)]
pub struct DisplayStateManager {
    state: ScreenState,
}

impl Default for DisplayStateManager {
    fn default() -> Self {
        Self {
            state: ScreenState::Empty,
        }
    }
}

impl DisplayStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn show_content(&mut self) {
        self.state = ScreenState::Content;
    }

    pub fn show_error(&mut self, details: ErrorDetails) {
        self.state = ScreenState::Error(details);
    }

    pub fn show_empty(&mut self) {
        self.state = ScreenState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_placeholder() {
        let display = DisplayStateManager::new();
        assert_eq!(display.state(), &ScreenState::Empty);
        assert_eq!(display.state().marker(), "sb-show-nopreview");
    }

    #[test]
    fn each_transition_replaces_the_previous_state() {
        let mut display = DisplayStateManager::new();
        display.show_error(ErrorDetails::new("boom", "at story"));
        assert_eq!(display.state().marker(), "sb-show-errordisplay");

        display.show_content();
        assert_eq!(display.state(), &ScreenState::Content);

        display.show_empty();
        assert_eq!(display.state().marker(), "sb-show-nopreview");
    }
}
