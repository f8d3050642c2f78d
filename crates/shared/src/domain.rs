use std::fmt;

use serde::{Deserialize, Serialize};

/// Story id used by the store when nothing has been selected yet.
pub const NO_SELECTION: &str = "*";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(StoryId);
id_newtype!(Kind);

impl StoryId {
    pub fn no_selection() -> Self {
        Self::new(NO_SELECTION)
    }

    pub fn is_no_selection(&self) -> bool {
        self.0 == NO_SELECTION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Story,
    Docs,
}

/// Identifies one build of a story's decorated render function.
///
/// Stores hand out a fresh handle whenever a story module is (re)loaded, so
/// comparing handles tells a hot reload apart from a plain re-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecoratedHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub story_id: StoryId,
    pub view_mode: ViewMode,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            story_id: StoryId::no_selection(),
            view_mode: ViewMode::Story,
        }
    }
}

/// Logical identity of what is currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderMetadata {
    pub id: StoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    pub view_mode: ViewMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorated: Option<DecoratedHandle>,
}

/// Which parts of the render identity moved between two renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataChanges {
    pub id: bool,
    pub implementation: bool,
    pub view_mode: bool,
    pub kind: bool,
}

impl MetadataChanges {
    /// Every flag is set when there is no previous render.
    pub fn between(previous: Option<&RenderMetadata>, current: &RenderMetadata) -> Self {
        match previous {
            None => Self {
                id: true,
                implementation: true,
                view_mode: true,
                kind: true,
            },
            Some(previous) => Self {
                id: previous.id != current.id,
                implementation: previous.decorated != current.decorated,
                view_mode: previous.view_mode != current.view_mode,
                kind: previous.kind != current.kind,
            },
        }
    }

    /// A kind change on its own never forces a render.
    pub fn requires_render(&self) -> bool {
        self.id || self.implementation || self.view_mode
    }

    pub fn is_transition(&self) -> bool {
        self.id || self.kind || self.view_mode
    }
}
