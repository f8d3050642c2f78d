//! Docs render path: mounts a docs page, wrapped in its container, into the docs surface.

use std::{fmt, sync::Arc};

use shared::{
    domain::{Kind, RenderMetadata, StoryId, ViewMode},
    error::PreviewError,
};
use tracing::debug;

use crate::{
    surface::{MountedView, Surface, ViewSurfaceManager},
    StoryContext, StoryData, StoryStore,
};

const NO_DOCS_MESSAGE: &str = "No docs found for this component";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsView {
    pub kind: Kind,
    pub body: String,
    /// Container names, innermost first.
    pub containers: Vec<String>,
}

/// Read-only view handed to docs containers and pages.
#[derive(Clone)]
pub struct DocsContext {
    story: StoryContext,
    store: Arc<dyn StoryStore>,
}

impl DocsContext {
    pub fn story(&self) -> &StoryContext {
        &self.story
    }

    /// Looks up another story, e.g. to embed it in the page.
    pub fn resolve(&self, id: &StoryId) -> Option<StoryData> {
        self.store.resolve_by_id(id)
    }
}

impl fmt::Debug for DocsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocsContext")
            .field("story", &self.story)
            .finish_non_exhaustive()
    }
}

pub trait DocsContainer: Send + Sync {
    fn name(&self) -> &str;
    fn wrap(&self, context: &DocsContext, page: DocsView) -> DocsView;
}

pub trait DocsPage: Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, context: &DocsContext) -> DocsView;
}

pub struct PassthroughContainer;

impl DocsContainer for PassthroughContainer {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn wrap(&self, _context: &DocsContext, page: DocsView) -> DocsView {
        page
    }
}

pub struct NoDocsPage;

impl DocsPage for NoDocsPage {
    fn name(&self) -> &str {
        "no-docs"
    }

    fn render(&self, context: &DocsContext) -> DocsView {
        DocsView {
            kind: context.story().kind.clone(),
            body: NO_DOCS_MESSAGE.to_string(),
            containers: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct DocsParameters {
    pub container: Option<Arc<dyn DocsContainer>>,
    pub page: Option<Arc<dyn DocsPage>>,
}

impl fmt::Debug for DocsParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocsParameters")
            .field("container", &self.container.as_ref().map(|c| c.name()))
            .field("page", &self.page.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Returns the rendered kind, or `None` when there is nothing to show yet.
pub(crate) fn render_docs(
    surfaces: &mut ViewSurfaceManager,
    metadata: &RenderMetadata,
    story: Option<&StoryData>,
    store: Arc<dyn StoryStore>,
) -> Result<Option<Kind>, PreviewError> {
    if metadata.id.is_no_selection() {
        return Ok(None);
    }
    let Some((story, parameters)) =
        story.and_then(|story| story.parameters.as_ref().map(|parameters| (story, parameters)))
    else {
        debug!(story_id = %metadata.id, "no story parameters yet; skipping docs");
        return Ok(None);
    };

    let docs = &parameters.docs;
    let container: Arc<dyn DocsContainer> = match (&docs.container, &docs.page) {
        (Some(container), _) => Arc::clone(container),
        (None, Some(_)) => {
            return Err(PreviewError::DocsPageWithoutContainer {
                kind: story.kind.clone(),
            })
        }
        (None, None) => Arc::new(PassthroughContainer),
    };
    let page: Arc<dyn DocsPage> = docs
        .page
        .clone()
        .unwrap_or_else(|| Arc::new(NoDocsPage));

    let context = DocsContext {
        story: story.context(ViewMode::Docs),
        store,
    };
    let view = container.wrap(&context, page.render(&context));
    debug!(kind = %story.kind, page = page.name(), container = container.name(), "mounting docs");
    surfaces.mount(Surface::Docs, MountedView::Docs(view));
    Ok(Some(story.kind.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryStoryStore, StoryParameters};

    struct TitlePage;

    impl DocsPage for TitlePage {
        fn name(&self) -> &str {
            "title"
        }

        fn render(&self, context: &DocsContext) -> DocsView {
            DocsView {
                kind: context.story().kind.clone(),
                body: format!("# {}", context.story().kind),
                containers: Vec::new(),
            }
        }
    }

    struct Frame;

    impl DocsContainer for Frame {
        fn name(&self) -> &str {
            "frame"
        }

        fn wrap(&self, _context: &DocsContext, mut page: DocsView) -> DocsView {
            page.containers.push(self.name().to_string());
            page
        }
    }

    fn metadata(story: &StoryData) -> RenderMetadata {
        RenderMetadata {
            id: story.id.clone(),
            kind: Some(story.kind.clone()),
            view_mode: ViewMode::Docs,
            decorated: None,
        }
    }

    fn with_docs(docs: DocsParameters) -> StoryData {
        StoryData::new("button--primary", "Button", "Primary").with_parameters(Some(
            StoryParameters {
                docs,
                ..StoryParameters::default()
            },
        ))
    }

    #[test]
    fn defaults_mount_placeholder_page() {
        let mut surfaces = ViewSurfaceManager::new();
        let story = with_docs(DocsParameters::default());
        let kind = render_docs(
            &mut surfaces,
            &metadata(&story),
            Some(&story),
            Arc::new(InMemoryStoryStore::new()),
        )
        .expect("docs render");

        assert_eq!(kind, Some(Kind::new("Button")));
        let Some(MountedView::Docs(view)) = surfaces.mounted(Surface::Docs) else {
            panic!("docs view should be mounted");
        };
        assert_eq!(view.body, NO_DOCS_MESSAGE);
        assert!(view.containers.is_empty());
    }

    #[test]
    fn custom_page_renders_inside_custom_container() {
        let mut surfaces = ViewSurfaceManager::new();
        let story = with_docs(DocsParameters {
            container: Some(Arc::new(Frame)),
            page: Some(Arc::new(TitlePage)),
        });
        render_docs(
            &mut surfaces,
            &metadata(&story),
            Some(&story),
            Arc::new(InMemoryStoryStore::new()),
        )
        .expect("docs render");

        let Some(MountedView::Docs(view)) = surfaces.mounted(Surface::Docs) else {
            panic!("docs view should be mounted");
        };
        assert_eq!(view.body, "# Button");
        assert_eq!(view.containers, vec!["frame".to_string()]);
    }

    #[test]
    fn page_without_container_is_a_configuration_error() {
        let mut surfaces = ViewSurfaceManager::new();
        let story = with_docs(DocsParameters {
            container: None,
            page: Some(Arc::new(TitlePage)),
        });
        let err = render_docs(
            &mut surfaces,
            &metadata(&story),
            Some(&story),
            Arc::new(InMemoryStoryStore::new()),
        )
        .expect_err("must fail");

        assert!(matches!(err, PreviewError::DocsPageWithoutContainer { .. }));
        assert!(surfaces.mounted(Surface::Docs).is_none());
    }

    #[test]
    fn nothing_selected_or_no_parameters_is_a_silent_no_op() {
        let mut surfaces = ViewSurfaceManager::new();
        let store: Arc<dyn StoryStore> = Arc::new(InMemoryStoryStore::new());

        let none_selected = RenderMetadata {
            id: StoryId::no_selection(),
            kind: None,
            view_mode: ViewMode::Docs,
            decorated: None,
        };
        assert_eq!(
            render_docs(&mut surfaces, &none_selected, None, Arc::clone(&store)).expect("no-op"),
            None
        );

        let bare = StoryData::new("button--primary", "Button", "Primary").with_parameters(None);
        assert_eq!(
            render_docs(&mut surfaces, &metadata(&bare), Some(&bare), store).expect("no-op"),
            None
        );
        assert!(surfaces.take_ops().is_empty());
    }
}
