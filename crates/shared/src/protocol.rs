use serde::{Deserialize, Serialize};

use crate::{
    domain::{Kind, RenderMetadata, StoryId, ViewMode},
    error::{ErrorDetails, RenderErrorDetails},
};

pub type Args = serde_json::Map<String, serde_json::Value>;

/// Inbound notifications that ask the preview to reconcile what it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PreviewTrigger {
    SetCurrentStory {
        story_id: StoryId,
        #[serde(default)]
        view_mode: ViewMode,
    },
    UpdateStoryArgs {
        story_id: StoryId,
        updated_args: Args,
    },
    UpdateGlobals {
        globals: Args,
    },
    ForceReRender,
}

impl PreviewTrigger {
    pub fn forces_render(&self) -> bool {
        matches!(self, Self::ForceReRender)
    }
}

/// Outbound lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PreviewEvent {
    StoryUnchanged(RenderMetadata),
    StoryChanged(StoryId),
    StoryRendered(StoryId),
    StoryMissing(StoryId),
    DocsRendered(Kind),
    StoryThrewException(ErrorDetails),
    StoryErrored(RenderErrorDetails),
}
