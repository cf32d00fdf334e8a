//! Opaque document bodies
//!
//! The rest of the crate never looks inside a body; it only asks it to render
//! itself into an output buffer with a set of component overrides.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

use super::{ComponentMap, MarkdownRenderer};

/// A renderable document body
pub trait ContentBody: Send + Sync + fmt::Debug {
    /// Render the body as HTML into `out`, resolving MDX components via `components`
    fn render_into(&self, out: &mut String, components: &ComponentMap) -> Result<()>;
}

/// Shared handle to a document body
pub type Body = Arc<dyn ContentBody>;

/// Markdown/MDX source rendered on demand
pub struct MdxBody {
    source: String,
    renderer: Arc<MarkdownRenderer>,
}

impl MdxBody {
    pub fn new(source: impl Into<String>, renderer: Arc<MarkdownRenderer>) -> Self {
        Self {
            source: source.into(),
            renderer,
        }
    }

    pub fn into_body(self) -> Body {
        Arc::new(self)
    }
}

impl fmt::Debug for MdxBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MdxBody")
            .field("len", &self.source.len())
            .finish()
    }
}

impl ContentBody for MdxBody {
    fn render_into(&self, out: &mut String, components: &ComponentMap) -> Result<()> {
        let html = self.renderer.render_mdx(&self.source, components)?;
        out.push_str(&html);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mdx_body_renders_with_components() {
        let renderer = Arc::new(MarkdownRenderer::new());
        let body = MdxBody::new(
            "# Hello\n\n<Callout type=\"warn\">Careful</Callout>\n",
            renderer,
        )
        .into_body();

        let mut out = String::new();
        body.render_into(&mut out, &ComponentMap::default()).unwrap();
        assert!(out.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(out.contains("callout-warn"));
        assert!(out.contains("Careful"));
    }
}
