//! Story render path, render controls and the failure channels shared by both.

use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use shared::{
    domain::{RenderMetadata, StoryId, ViewMode},
    error::{ErrorDetails, RenderErrorDetails},
    protocol::PreviewEvent,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error};

use crate::{
    surface::{ActiveSurface, MountedView, Surface},
    BoundStory, PreviewState, RenderRequest, StoryContext, StoryData, StoryOutput, StoryRenderer,
};

#[derive(Clone)]
pub(crate) struct PreviewHandle {
    pub(crate) state: Arc<Mutex<PreviewState>>,
    pub(crate) events: broadcast::Sender<PreviewEvent>,
}

impl PreviewHandle {
    pub(crate) fn emit(&self, event: PreviewEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) async fn show_content(&self) {
        self.state.lock().await.display.show_content();
    }

    pub(crate) async fn show_empty(&self) {
        self.state.lock().await.display.show_empty();
    }

    pub(crate) async fn show_error_screen(&self, details: ErrorDetails) {
        self.state.lock().await.display.show_error(details);
    }

    pub(crate) async fn render_exception(&self, err: &anyhow::Error) {
        let details = ErrorDetails::from_error(err);
        self.emit(PreviewEvent::StoryThrewException(details.clone()));
        self.show_error_screen(details).await;
        error!(error = ?err, "story threw an exception while rendering");
    }

    pub(crate) async fn render_error(&self, details: RenderErrorDetails) {
        self.emit(PreviewEvent::StoryErrored(details.clone()));
        self.show_error_screen(details.into()).await;
    }

    /// The first story mount also makes the primary surface visible.
    async fn mount_story(&self, id: StoryId, content: String) {
        let mut state = self.state.lock().await;
        if state.surfaces.active() == ActiveSurface::None {
            state.surfaces.show(Surface::Primary);
        }
        state
            .surfaces
            .mount(Surface::Primary, MountedView::Story { id, content });
    }
}

/// Callbacks a renderer uses to drive the screen for the story it renders.
#[derive(Clone)]
pub struct RenderControls {
    handle: PreviewHandle,
    story_id: StoryId,
}

impl RenderControls {
    pub(crate) fn new(handle: PreviewHandle, story_id: StoryId) -> Self {
        Self { handle, story_id }
    }

    pub fn story_id(&self) -> &StoryId {
        &self.story_id
    }

    pub async fn show_main(&self) {
        self.handle.show_content().await;
    }

    pub async fn show_error(&self, details: RenderErrorDetails) {
        self.handle.render_error(details).await;
    }

    pub async fn show_exception(&self, err: &anyhow::Error) {
        self.handle.render_exception(err).await;
    }

    pub async fn mount(&self, content: impl Into<String>) {
        self.handle.mount_story(self.story_id.clone(), content.into()).await;
    }
}

impl fmt::Debug for RenderControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderControls")
            .field("story_id", &self.story_id)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn render_story(
    handle: &PreviewHandle,
    renderer: &dyn StoryRenderer,
    metadata: &RenderMetadata,
    story: Option<&StoryData>,
    force_render: bool,
    controls: RenderControls,
) {
    let Some((story, decorated)) =
        story.and_then(|story| story.decorated.as_ref().map(|decorated| (story, decorated)))
    else {
        debug!(story_id = %metadata.id, "no render function for story");
        handle.show_empty().await;
        handle.emit(PreviewEvent::StoryMissing(metadata.id.clone()));
        return;
    };

    let outcome = async {
        let context = load_story_context(story, metadata.view_mode).await?;
        let bound_story = BoundStory::new(Arc::clone(&decorated.story_fn), context.clone());
        renderer
            .render(RenderRequest {
                context,
                bound_story,
                force_render,
                controls,
            })
            .await
    }
    .await;

    match outcome {
        Ok(()) => handle.emit(PreviewEvent::StoryRendered(metadata.id.clone())),
        Err(err) => handle.render_exception(&err).await,
    }
}

/// Runs every loader concurrently and merges their values in declaration order.
pub(crate) async fn load_story_context(
    story: &StoryData,
    view_mode: ViewMode,
) -> Result<StoryContext> {
    let mut context = story.context(view_mode);
    let loaded = try_join_all(story.loaders.iter().map(|loader| loader.load(&context)))
        .await
        .with_context(|| format!("loaders failed for story {}", story.id))?;
    for values in loaded {
        context.loaded.extend(values);
    }
    Ok(context)
}

/// Renders story output as markup into the primary surface.
#[derive(Debug, Default)]
pub struct HeadlessRenderer;

#[async_trait]
impl StoryRenderer for HeadlessRenderer {
    async fn render(&self, request: RenderRequest) -> Result<()> {
        let RenderRequest {
            bound_story,
            controls,
            ..
        } = request;

        match bound_story.invoke()? {
            StoryOutput::Element(markup) => {
                controls.show_main().await;
                controls.mount(markup).await;
            }
            StoryOutput::Nothing => {
                controls
                    .show_error(RenderErrorDetails::new(
                        format!(
                            "Expecting a story element from the story: \"{}\" of \"{}\".",
                            bound_story.context().name,
                            bound_story.context().kind
                        ),
                        "Did you forget to return the story element from the story?",
                    ))
                    .await;
            }
        }
        Ok(())
    }
}
