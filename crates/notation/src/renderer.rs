use async_trait::async_trait;
use thiserror::Error;

use crate::{make_responsive, RenderOptions};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("{0}")]
    Load(String),
    #[error("page {page} out of range (document has {pages})")]
    Page { page: u32, pages: u32 },
    #[error("unknown renderer handle {0}")]
    UnknownHandle(u64),
    #[error("malformed rendered markup: {0}")]
    Markup(String),
}

/// A document loaded into a renderer, ready to be rendered page by page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererHandle {
    pub id: u64,
    pub pages: u32,
}

#[async_trait]
pub trait NotationRenderer: Send + Sync {
    /// Parses notation source. Fails on malformed markup.
    async fn load_markup(&self, text: &str) -> Result<RendererHandle, RenderError>;

    fn render(
        &self,
        handle: &RendererHandle,
        page: u32,
        options: &RenderOptions,
    ) -> Result<String, RenderError>;

    /// Drops a loaded document. Rendering `handle` afterwards fails.
    fn release(&self, handle: &RendererHandle);
}

/// Renders `page` and makes the result fit its container.
pub fn render_responsive(
    renderer: &dyn NotationRenderer,
    handle: &RendererHandle,
    page: u32,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let markup = renderer.render(handle, page, options)?;
    make_responsive(&markup)
}
