//! Story catalog read from JSON and registered into an in-memory store.

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use preview_core::{
    DocsContainer, DocsContext, DocsPage, DocsParameters, DocsView, InMemoryStoryStore,
    StoryContext, StoryData, StoryFn, StoryOutput, StoryParameters,
};
use serde::Deserialize;
use shared::protocol::Args;

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub stories: Vec<StoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StoryEntry {
    pub id: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub docs_only: bool,
    #[serde(default)]
    pub args: Args,
    /// Markup with `{arg}` placeholders; absent means the story has no function.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub docs: Option<DocsEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DocsEntry {
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read story catalog '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid story catalog '{}'", path.display()))
}

impl Catalog {
    pub fn register(self, store: &InMemoryStoryStore) -> usize {
        let count = self.stories.len();
        for entry in self.stories {
            let story_fn = entry
                .template
                .clone()
                .map(|template| Arc::new(TemplateStory(template)) as Arc<dyn StoryFn>);
            store.add_story(entry.into_story(), story_fn);
        }
        count
    }
}

impl StoryEntry {
    fn into_story(self) -> StoryData {
        let docs = self
            .docs
            .map(|docs| DocsParameters {
                container: docs
                    .container
                    .map(|name| Arc::new(NamedContainer(name)) as Arc<dyn DocsContainer>),
                page: docs
                    .page
                    .map(|body| Arc::new(MarkdownPage(body)) as Arc<dyn DocsPage>),
            })
            .unwrap_or_default();

        StoryData::new(self.id, self.kind, self.name)
            .with_args(self.args)
            .with_parameters(Some(StoryParameters {
                docs_only: self.docs_only,
                layout: self.layout,
                docs,
            }))
    }
}

/// Fills `{arg}` placeholders from the story's args; an empty template renders nothing.
struct TemplateStory(String);

impl StoryFn for TemplateStory {
    fn call(&self, context: &StoryContext) -> Result<StoryOutput> {
        if self.0.is_empty() {
            return Ok(StoryOutput::Nothing);
        }
        let mut markup = self.0.clone();
        for (key, value) in context.args.iter().chain(context.loaded.iter()) {
            let value = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            markup = markup.replace(&format!("{{{key}}}"), &value);
        }
        Ok(StoryOutput::Element(markup))
    }
}

struct NamedContainer(String);

impl DocsContainer for NamedContainer {
    fn name(&self) -> &str {
        &self.0
    }

    fn wrap(&self, _context: &DocsContext, mut page: DocsView) -> DocsView {
        page.containers.push(self.0.clone());
        page
    }
}

struct MarkdownPage(String);

impl DocsPage for MarkdownPage {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(&self, context: &DocsContext) -> DocsView {
        DocsView {
            kind: context.story().kind.clone(),
            body: self.0.clone(),
            containers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use preview_core::StoryStore;
    use serde_json::json;
    use shared::domain::{StoryId, ViewMode};

    use super::*;

    const CATALOG: &str = r#"{
        "stories": [
            {"id": "button--primary", "kind": "Button", "name": "Primary",
             "layout": "centered", "args": {"label": "Go", "size": 2},
             "template": "<button size={size}>{label}</button>",
             "docs": {"container": "frame", "page": "Buttons do things."}},
            {"id": "button--ghost", "kind": "Button", "name": "Ghost"}
        ]
    }"#;

    fn store() -> InMemoryStoryStore {
        let catalog: Catalog = serde_json::from_str(CATALOG).expect("catalog");
        let store = InMemoryStoryStore::new();
        assert_eq!(catalog.register(&store), 2);
        store
    }

    #[test]
    fn template_fills_args() {
        let story = store()
            .resolve_by_id(&StoryId::new("button--primary"))
            .expect("story");
        let decorated = story.decorated.clone().expect("story fn");
        let output = decorated
            .story_fn
            .call(&story.context(ViewMode::Story))
            .expect("call");
        assert_eq!(
            output,
            StoryOutput::Element("<button size=2>Go</button>".into())
        );
        assert_eq!(story.args.get("label"), Some(&json!("Go")));
        let parameters = story.parameters.expect("parameters");
        assert_eq!(parameters.layout.as_deref(), Some("centered"));
        assert!(parameters.docs.container.is_some());
    }

    #[test]
    fn entry_without_template_has_no_story_fn() {
        let story = store()
            .resolve_by_id(&StoryId::new("button--ghost"))
            .expect("story");
        assert!(story.decorated.is_none());
    }

    #[test]
    fn empty_template_renders_nothing() {
        let story = StoryData::new("a", "K", "A");
        let output = TemplateStory(String::new())
            .call(&story.context(ViewMode::Story))
            .expect("call");
        assert_eq!(output, StoryOutput::Nothing);
    }
}
