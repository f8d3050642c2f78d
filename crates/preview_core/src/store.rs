//! In-memory story store used by the headless driver and tests.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use shared::{
    domain::{DecoratedHandle, Kind, Selection, StoryId, ViewMode},
    error::ErrorDetails,
    protocol::{Args, PreviewTrigger},
};
use tracing::debug;

use crate::{DecoratedStory, StoryData, StoryFn, StoryStore};

#[derive(Default)]
struct StoreState {
    stories: HashMap<StoryId, StoryData>,
    selection: Selection,
    globals: Args,
    load_error: Option<ErrorDetails>,
    generation: u64,
    story_releases: HashMap<StoryId, usize>,
    kind_releases: HashMap<Kind, usize>,
}

impl StoreState {
    fn next_handle(&mut self) -> DecoratedHandle {
        self.generation += 1;
        DecoratedHandle(self.generation)
    }
}

#[derive(Default)]
pub struct InMemoryStoryStore {
    inner: Mutex<StoreState>,
}

impl InMemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `story`; a story without a function resolves as missing.
    pub fn add_story(
        &self,
        mut story: StoryData,
        story_fn: Option<Arc<dyn StoryFn>>,
    ) -> Option<DecoratedHandle> {
        let mut guard = self.inner.lock();
        story.decorated =
            story_fn.map(|story_fn| DecoratedStory::new(guard.next_handle(), story_fn));
        let handle = story.decorated.as_ref().map(|decorated| decorated.handle);
        guard.stories.insert(story.id.clone(), story);
        handle
    }

    /// Swaps in a new build of a story's function under a fresh handle.
    pub fn hot_reload(&self, id: &StoryId, story_fn: Arc<dyn StoryFn>) -> Option<DecoratedHandle> {
        let mut guard = self.inner.lock();
        let handle = guard.next_handle();
        let story = guard.stories.get_mut(id)?;
        story.decorated = Some(DecoratedStory::new(handle, story_fn));
        debug!(story_id = %id, generation = handle.0, "story hot reloaded");
        Some(handle)
    }

    pub fn select(&self, story_id: StoryId, view_mode: ViewMode) {
        self.inner.lock().selection = Selection {
            story_id,
            view_mode,
        };
    }

    pub fn set_load_error(&self, load_error: Option<ErrorDetails>) {
        self.inner.lock().load_error = load_error;
    }

    pub fn story_release_count(&self, id: &StoryId) -> usize {
        self.inner
            .lock()
            .story_releases
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    pub fn kind_release_count(&self, kind: &Kind) -> usize {
        self.inner
            .lock()
            .kind_releases
            .get(kind)
            .copied()
            .unwrap_or_default()
    }
}

impl StoryStore for InMemoryStoryStore {
    fn load_error(&self) -> Option<ErrorDetails> {
        self.inner.lock().load_error.clone()
    }

    fn selection(&self) -> Selection {
        self.inner.lock().selection.clone()
    }

    fn resolve_by_id(&self, id: &StoryId) -> Option<StoryData> {
        let guard = self.inner.lock();
        let mut story = guard.stories.get(id)?.clone();
        story.globals = guard.globals.clone();
        Some(story)
    }

    fn release_story_resources(&self, id: &StoryId) {
        *self
            .inner
            .lock()
            .story_releases
            .entry(id.clone())
            .or_default() += 1;
    }

    fn release_kind_resources(&self, kind: &Kind) {
        *self
            .inner
            .lock()
            .kind_releases
            .entry(kind.clone())
            .or_default() += 1;
    }

    fn apply_trigger(&self, trigger: &PreviewTrigger) {
        let mut guard = self.inner.lock();
        match trigger {
            PreviewTrigger::SetCurrentStory {
                story_id,
                view_mode,
            } => {
                guard.selection = Selection {
                    story_id: story_id.clone(),
                    view_mode: *view_mode,
                };
            }
            PreviewTrigger::UpdateStoryArgs {
                story_id,
                updated_args,
            } => match guard.stories.get_mut(story_id) {
                Some(story) => story.args.extend(updated_args.clone()),
                None => debug!(%story_id, "args update for unknown story ignored"),
            },
            PreviewTrigger::UpdateGlobals { globals } => {
                guard.globals.extend(globals.clone());
            }
            PreviewTrigger::ForceReRender => {}
        }
    }
}
