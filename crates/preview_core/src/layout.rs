//! Maps logical layout names onto the single layout class applied to the preview root.

use tracing::{debug, warn};

pub const DEFAULT_LAYOUT: &str = "padded";
pub const NO_LAYOUT: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutClass {
    Centered,
    Fullscreen,
    Padded,
}

impl LayoutClass {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "centered" => Some(Self::Centered),
            "fullscreen" => Some(Self::Fullscreen),
            "padded" => Some(Self::Padded),
            _ => None,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Centered => "sb-main-centered",
            Self::Fullscreen => "sb-main-fullscreen",
            Self::Padded => "sb-main-padded",
        }
    }
}

#[derive(Debug, Default)]
pub struct LayoutPolicy {
    applied: Option<LayoutClass>,
}

impl LayoutPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Option<LayoutClass> {
        self.applied
    }

    /// Applies `layout`, falling back to `default` when the story declares none.
    ///
    /// Unknown names are logged and leave no class applied.
    pub fn apply(&mut self, layout: Option<&str>, default: &str) {
        let name = layout.unwrap_or(default);
        if name == NO_LAYOUT {
            if let Some(previous) = self.applied.take() {
                debug!(class = previous.css_class(), "cleared layout class");
            }
            return;
        }

        let class = LayoutClass::from_name(name);
        if class.is_none() {
            warn!(
                layout = name,
                "invalid layout; expected one of centered, fullscreen, padded, none"
            );
        }

        if let Some(previous) = self.applied.take() {
            debug!(class = previous.css_class(), "removed layout class");
        }
        if let Some(class) = class {
            debug!(class = class.css_class(), "applied layout class");
        }
        self.applied = class;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_layout_uses_default() {
        let mut policy = LayoutPolicy::new();
        policy.apply(None, DEFAULT_LAYOUT);
        assert_eq!(policy.applied(), Some(LayoutClass::Padded));
    }

    #[test]
    fn none_clears_applied_class() {
        let mut policy = LayoutPolicy::new();
        policy.apply(Some("fullscreen"), DEFAULT_LAYOUT);
        policy.apply(Some(NO_LAYOUT), DEFAULT_LAYOUT);
        assert_eq!(policy.applied(), None);
    }

    #[test]
    fn applying_same_layout_twice_is_idempotent() {
        let mut policy = LayoutPolicy::new();
        policy.apply(Some("centered"), DEFAULT_LAYOUT);
        policy.apply(Some("centered"), DEFAULT_LAYOUT);
        assert_eq!(policy.applied(), Some(LayoutClass::Centered));
    }

    #[test]
    fn invalid_layout_replaces_previous_with_nothing() {
        let mut policy = LayoutPolicy::new();
        policy.apply(Some("centered"), DEFAULT_LAYOUT);
        policy.apply(Some("sideways"), DEFAULT_LAYOUT);
        assert_eq!(policy.applied(), None);
    }

    #[test]
    fn classes_are_stable() {
        assert_eq!(LayoutClass::Fullscreen.css_class(), "sb-main-fullscreen");
        assert_eq!(LayoutClass::from_name("padded"), Some(LayoutClass::Padded));
        assert_eq!(LayoutClass::from_name("none"), None);
    }
}
