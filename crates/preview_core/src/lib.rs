use std::{fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use shared::{
    domain::{DecoratedHandle, Kind, MetadataChanges, RenderMetadata, Selection, StoryId, ViewMode},
    error::{ErrorDetails, PreviewError, RenderErrorDetails},
    protocol::{Args, PreviewEvent, PreviewTrigger},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, error, warn};

pub mod display;
pub mod docs;
pub mod layout;
mod render;
pub mod store;
pub mod surface;

pub use display::{DisplayStateManager, ScreenState};
pub use docs::{
    DocsContainer, DocsContext, DocsPage, DocsParameters, DocsView, NoDocsPage,
    PassthroughContainer,
};
pub use layout::{LayoutClass, LayoutPolicy, DEFAULT_LAYOUT};
pub use render::{HeadlessRenderer, RenderControls};
pub use store::InMemoryStoryStore;
pub use surface::{
    ActiveSurface, MountedView, Surface, SurfaceOp, ViewSurfaceManager, MAX_JOURNALED_OPS,
};

use render::PreviewHandle;

const DEFAULT_EVENT_CAPACITY: usize = 1024;
const DOCS_LAYOUT: &str = "fullscreen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryOutput {
    Element(String),
    Nothing,
}

/// An undecorated story function; it is bound to a loaded [`StoryContext`] before rendering.
pub trait StoryFn: Send + Sync {
    fn call(&self, context: &StoryContext) -> Result<StoryOutput>;
}

impl<F> StoryFn for F
where
    F: Fn(&StoryContext) -> Result<StoryOutput> + Send + Sync,
{
    fn call(&self, context: &StoryContext) -> Result<StoryOutput> {
        self(context)
    }
}

/// Story function that always produces the same output.
#[derive(Debug, Clone)]
pub struct StaticStory(pub StoryOutput);

impl StoryFn for StaticStory {
    fn call(&self, _context: &StoryContext) -> Result<StoryOutput> {
        Ok(self.0.clone())
    }
}

#[async_trait]
pub trait StoryLoader: Send + Sync {
    /// Values returned by every loader are merged into [`StoryContext::loaded`].
    async fn load(&self, context: &StoryContext) -> Result<Args>;
}

#[derive(Clone)]
pub struct DecoratedStory {
    pub handle: DecoratedHandle,
    pub story_fn: Arc<dyn StoryFn>,
}

impl DecoratedStory {
    pub fn new(handle: DecoratedHandle, story_fn: Arc<dyn StoryFn>) -> Self {
        Self { handle, story_fn }
    }
}

impl fmt::Debug for DecoratedStory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedStory")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoryParameters {
    pub docs_only: bool,
    pub layout: Option<String>,
    pub docs: DocsParameters,
}

/// Everything the store knows about one story.
#[derive(Clone)]
pub struct StoryData {
    pub id: StoryId,
    pub kind: Kind,
    pub name: String,
    pub parameters: Option<StoryParameters>,
    pub args: Args,
    pub globals: Args,
    pub loaders: Vec<Arc<dyn StoryLoader>>,
    pub decorated: Option<DecoratedStory>,
}

impl StoryData {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: StoryId::new(id),
            kind: Kind::new(kind),
            name: name.into(),
            parameters: Some(StoryParameters::default()),
            args: Args::new(),
            globals: Args::new(),
            loaders: Vec::new(),
            decorated: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Option<StoryParameters>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn StoryLoader>) -> Self {
        self.loaders.push(loader);
        self
    }

    pub fn context(&self, view_mode: ViewMode) -> StoryContext {
        StoryContext {
            id: self.id.clone(),
            kind: self.kind.clone(),
            name: self.name.clone(),
            view_mode,
            args: self.args.clone(),
            globals: self.globals.clone(),
            loaded: Args::new(),
        }
    }
}

impl fmt::Debug for StoryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryData")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("args", &self.args)
            .field("globals", &self.globals)
            .field("loaders", &self.loaders.len())
            .field("decorated", &self.decorated)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoryContext {
    pub id: StoryId,
    pub kind: Kind,
    pub name: String,
    pub view_mode: ViewMode,
    pub args: Args,
    pub globals: Args,
    pub loaded: Args,
}

/// A story function paired with the context it renders with.
#[derive(Clone)]
pub struct BoundStory {
    story_fn: Arc<dyn StoryFn>,
    context: StoryContext,
}

impl BoundStory {
    pub fn new(story_fn: Arc<dyn StoryFn>, context: StoryContext) -> Self {
        Self { story_fn, context }
    }

    pub fn context(&self) -> &StoryContext {
        &self.context
    }

    pub fn invoke(&self) -> Result<StoryOutput> {
        self.story_fn.call(&self.context)
    }
}

pub struct RenderRequest {
    pub context: StoryContext,
    pub bound_story: BoundStory,
    pub force_render: bool,
    pub controls: RenderControls,
}

#[async_trait]
pub trait StoryRenderer: Send + Sync {
    async fn render(&self, request: RenderRequest) -> Result<()>;
}

pub trait StoryStore: Send + Sync {
    fn load_error(&self) -> Option<ErrorDetails>;
    fn selection(&self) -> Selection;
    fn resolve_by_id(&self, id: &StoryId) -> Option<StoryData>;
    fn release_story_resources(&self, id: &StoryId);
    fn release_kind_resources(&self, kind: &Kind);

    /// Lets the store absorb a trigger's payload before the preview re-renders.
    fn apply_trigger(&self, _trigger: &PreviewTrigger) {}
}

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub default_layout: String,
    pub event_capacity: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            default_layout: DEFAULT_LAYOUT.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Per-attempt payload handed to [`PreviewEngine::reconcile`].
pub struct RenderContext {
    pub metadata: RenderMetadata,
    pub story: Option<StoryData>,
    pub layout: Option<String>,
    pub force_render: bool,
    pub controls: RenderControls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    pub previous: Option<RenderMetadata>,
    pub layout: Option<LayoutClass>,
    pub screen: ScreenState,
    pub active_surface: ActiveSurface,
    pub primary: Option<MountedView>,
    pub docs: Option<MountedView>,
}

#[derive(Debug, Default)]
pub(crate) struct PreviewState {
    pub(crate) previous: Option<RenderMetadata>,
    pub(crate) layout: LayoutPolicy,
    pub(crate) display: DisplayStateManager,
    pub(crate) surfaces: ViewSurfaceManager,
}

pub struct PreviewEngine {
    store: Arc<dyn StoryStore>,
    renderer: Arc<dyn StoryRenderer>,
    handle: PreviewHandle,
    options: PreviewOptions,
}

impl PreviewEngine {
    pub fn new(store: Arc<dyn StoryStore>, renderer: Arc<dyn StoryRenderer>) -> Arc<Self> {
        Self::new_with_options(store, renderer, PreviewOptions::default())
    }

    pub fn new_with_options(
        store: Arc<dyn StoryStore>,
        renderer: Arc<dyn StoryRenderer>,
        options: PreviewOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        Arc::new(Self {
            store,
            renderer,
            handle: PreviewHandle {
                state: Arc::new(Mutex::new(PreviewState::default())),
                events,
            },
            options,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PreviewEvent> {
        self.handle.events.subscribe()
    }

    pub async fn snapshot(&self) -> PreviewSnapshot {
        let state = self.handle.state.lock().await;
        PreviewSnapshot {
            previous: state.previous.clone(),
            layout: state.layout.applied(),
            screen: state.display.state().clone(),
            active_surface: state.surfaces.active(),
            primary: state.surfaces.mounted(Surface::Primary).cloned(),
            docs: state.surfaces.mounted(Surface::Docs).cloned(),
        }
    }

    pub async fn take_surface_ops(&self) -> Vec<SurfaceOp> {
        self.handle.state.lock().await.surfaces.take_ops()
    }

    pub fn spawn_trigger_loop(
        self: &Arc<Self>,
        triggers: broadcast::Receiver<PreviewTrigger>,
    ) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run_triggers(triggers).await })
    }

    /// Handles triggers one at a time until the sending side closes.
    pub async fn run_triggers(&self, triggers: broadcast::Receiver<PreviewTrigger>) {
        let mut triggers = BroadcastStream::new(triggers);
        while let Some(next) = triggers.next().await {
            match next {
                Ok(trigger) => {
                    if let Err(err) = self.handle_trigger(&trigger).await {
                        error!(error = %err, ?trigger, "preview render attempt failed");
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "preview trigger receiver lagged");
                }
            }
        }
    }

    pub async fn handle_trigger(&self, trigger: &PreviewTrigger) -> Result<(), PreviewError> {
        self.store.apply_trigger(trigger);
        self.render_current_story(trigger.forces_render()).await
    }

    pub async fn render_current_story(&self, force_render: bool) -> Result<(), PreviewError> {
        if let Some(load_error) = self.store.load_error() {
            warn!(message = %load_error.message, "story store failed to load");
            self.handle.show_error_screen(load_error).await;
            return Ok(());
        }

        let Selection {
            story_id,
            view_mode: requested_view_mode,
        } = self.store.selection();
        let story = self.store.resolve_by_id(&story_id);
        let parameters = story.as_ref().and_then(|story| story.parameters.as_ref());

        let view_mode = if parameters.is_some_and(|parameters| parameters.docs_only) {
            ViewMode::Docs
        } else {
            requested_view_mode
        };
        let layout = match view_mode {
            ViewMode::Docs => Some(DOCS_LAYOUT.to_string()),
            ViewMode::Story => parameters.and_then(|parameters| parameters.layout.clone()),
        };

        let metadata = RenderMetadata {
            id: story_id,
            kind: story.as_ref().map(|story| story.kind.clone()),
            view_mode,
            decorated: story
                .as_ref()
                .and_then(|story| story.decorated.as_ref())
                .map(|decorated| decorated.handle),
        };
        let context = self.render_context(metadata, story, layout, force_render);
        self.reconcile(context).await
    }

    pub fn render_context(
        &self,
        metadata: RenderMetadata,
        story: Option<StoryData>,
        layout: Option<String>,
        force_render: bool,
    ) -> RenderContext {
        let controls = RenderControls::new(self.handle.clone(), metadata.id.clone());
        RenderContext {
            metadata,
            story,
            layout,
            force_render,
            controls,
        }
    }

    pub async fn reconcile(&self, context: RenderContext) -> Result<(), PreviewError> {
        let RenderContext {
            metadata,
            story,
            layout,
            force_render,
            controls,
        } = context;

        let docs_kind = {
            let mut state = self.handle.state.lock().await;
            let previous = state.previous.clone();
            let changes = MetadataChanges::between(previous.as_ref(), &metadata);

            if !force_render && !changes.requires_render() {
                debug!(story_id = %metadata.id, "render skipped; metadata unchanged");
                self.handle.emit(PreviewEvent::StoryUnchanged(metadata));
                return Ok(());
            }

            if previous.is_some() && changes.is_transition() {
                self.handle.emit(PreviewEvent::StoryChanged(metadata.id.clone()));
            }

            match &previous {
                Some(previous) if previous.view_mode == ViewMode::Docs => {
                    if changes.kind || changes.view_mode {
                        if let Some(kind) = &previous.kind {
                            self.store.release_kind_resources(kind);
                        }
                        state.surfaces.unmount(Surface::Docs);
                    }
                }
                Some(previous) => {
                    if changes.id {
                        self.store.release_story_resources(&previous.id);
                    }
                    if changes.id || changes.view_mode {
                        state.surfaces.unmount(Surface::Primary);
                    }
                }
                None => {}
            }

            state
                .layout
                .apply(layout.as_deref(), &self.options.default_layout);

            if changes.view_mode {
                match metadata.view_mode {
                    ViewMode::Docs => {
                        state.display.show_content();
                        state.surfaces.show(Surface::Docs);
                    }
                    ViewMode::Story => {
                        if previous.is_some() {
                            state.surfaces.show(Surface::Primary);
                        }
                    }
                }
            }

            match metadata.view_mode {
                ViewMode::Docs => {
                    let rendered = docs::render_docs(
                        &mut state.surfaces,
                        &metadata,
                        story.as_ref(),
                        Arc::clone(&self.store),
                    );
                    // teardown already ran, so the failed attempt still becomes the baseline
                    if rendered.is_err() {
                        state.previous = Some(metadata.clone());
                    }
                    rendered?
                }
                ViewMode::Story => None,
            }
        };

        debug!(story_id = %metadata.id, view_mode = ?metadata.view_mode, force_render, "dispatching render");
        match metadata.view_mode {
            ViewMode::Docs => {
                if let Some(kind) = docs_kind {
                    self.handle.emit(PreviewEvent::DocsRendered(kind));
                }
            }
            ViewMode::Story => {
                render::render_story(
                    &self.handle,
                    self.renderer.as_ref(),
                    &metadata,
                    story.as_ref(),
                    force_render,
                    controls,
                )
                .await;
            }
        }

        let mut state = self.handle.state.lock().await;
        let reset_scroll = !force_render && metadata.view_mode != ViewMode::Docs;
        state.previous = Some(metadata);
        if reset_scroll {
            state.surfaces.reset_scroll();
        }
        Ok(())
    }

    pub async fn render_exception(&self, err: &anyhow::Error) {
        self.handle.render_exception(err).await;
    }

    pub async fn render_error(&self, details: RenderErrorDetails) {
        self.handle.render_error(details).await;
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
