//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::fmt;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::components::{split_segments, Segment};
use super::ComponentMap;
use crate::helpers::{add_heading_ids, html_escape};

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render MDX source: markdown runs plus component blocks
    pub fn render_mdx(&self, source: &str, components: &ComponentMap) -> Result<String> {
        let mut out = String::new();

        for segment in split_segments(source) {
            match segment {
                Segment::Markdown(text) => out.push_str(&self.render(text)?),
                Segment::Component {
                    name,
                    props,
                    children,
                } => {
                    let inner = match children {
                        Some(children) => self.render_mdx(children, components)?,
                        None => String::new(),
                    };
                    match components.render(&name, &props, &inner) {
                        Some(html) => out.push_str(&html),
                        None => {
                            tracing::warn!("No component registered for <{}>", name);
                            out.push_str(&format!(
                                r#"<div class="mdx-unknown" data-component="{}">{}</div>"#,
                                html_escape(&name),
                                inner
                            ));
                        }
                    }
                    out.push('\n');
                }
            }
        }

        Ok(out)
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // YAML metadata blocks stay off: front-matter is split off beforehand
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            (!lang.is_empty()).then_some(lang)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                _ => {
                    if code_block.is_none() {
                        events.push(event);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(add_heading_ids(&html_output))
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");
        let code_lines = lines.join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkdownRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownRenderer")
            .field("theme_name", &self.theme_name)
            .field("line_numbers", &self.line_numbers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```python\nprint('pwn')\n```").unwrap();
        assert!(html.contains("highlight python"));
        assert!(html.contains("line-number"));
    }

    #[test]
    fn test_render_code_block_without_line_numbers() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", false);
        let html = renderer.render("```\n<script>\n```").unwrap();
        assert!(html.contains("language-text"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_mdx_with_unknown_component() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render_mdx("<Mystery>\n*hi*\n</Mystery>\n", &ComponentMap::default())
            .unwrap();
        assert!(html.contains(r#"data-component="Mystery""#));
        assert!(html.contains("<em>hi</em>"));
    }

    #[test]
    fn test_render_mdx_nested_components() {
        let renderer = MarkdownRenderer::new();
        let src = "<Cards>\n<Card title=\"One\" href=\"/a\" />\n<Card title=\"Two\" />\n</Cards>\n";
        let html = renderer.render_mdx(src, &ComponentMap::default()).unwrap();
        assert!(html.starts_with(r#"<div class="cards">"#));
        assert!(html.contains(r#"<a class="card" href="/a">"#));
        assert!(html.contains(r#"<div class="card"><h3 class="card-title">Two</h3></div>"#));
    }
}
