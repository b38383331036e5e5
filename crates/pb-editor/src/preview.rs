//! Live preview: HTML for the canvas's preview pane, re-rendered only when
//! the store's revision has moved since the last render.

use crate::store::SchemaStore;
use pb_render::{RenderOptions, to_html};

#[derive(Debug, Clone)]
pub struct LivePreview {
    options: RenderOptions,
    rendered_at: Option<u64>,
    html: String,
    renders: u64,
}

impl LivePreview {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            rendered_at: None,
            html: String::new(),
            renders: 0,
        }
    }

    /// Current preview markup for `store`.
    pub fn html(&mut self, store: &mut SchemaStore) -> &str {
        let revision = store.revision();
        if self.rendered_at != Some(revision) {
            self.html = to_html(&store.render(), &self.options);
            self.rendered_at = Some(revision);
            self.renders += 1;
            log::debug!("preview rendered at revision {revision}");
        }
        &self.html
    }

    /// Force the next [`html`](Self::html) call to re-render.
    pub fn invalidate(&mut self) {
        self.rendered_at = None;
    }

    /// Whether `html` would re-render for `store` right now.
    pub fn is_stale(&self, store: &SchemaStore) -> bool {
        self.rendered_at != Some(store.revision())
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Default for LivePreview {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}
