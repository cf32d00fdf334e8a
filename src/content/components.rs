//! MDX component overrides
//!
//! Blog bodies may embed JSX-style blocks such as
//! `<Callout type="warn">...</Callout>` or `<Card title="x" href="/y" />`.
//! The source is split into markdown runs and component blocks; each block is
//! rendered by the component registered under its name.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::SiteConfig;
use crate::helpers::html_escape;

/// Component attributes, in authored order
pub type Props = IndexMap<String, String>;

/// Renders one MDX component to HTML
pub trait Component: Send + Sync {
    /// `children` is the already rendered HTML of the element's content
    fn render(&self, props: &Props, children: &str) -> String;
}

impl<F> Component for F
where
    F: Fn(&Props, &str) -> String + Send + Sync,
{
    fn render(&self, props: &Props, children: &str) -> String {
        self(props, children)
    }
}

/// Registry of components available to document bodies
pub struct ComponentMap {
    components: IndexMap<String, Box<dyn Component>>,
}

impl ComponentMap {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            components: IndexMap::new(),
        }
    }

    /// The built-in widgets: `Callout`, `Card`, `Cards` and `Showcase`
    /// (also registered as `FranckShowcase`)
    pub fn with_defaults(config: &SiteConfig) -> Self {
        let mut map = Self::new();
        map.insert("Callout", render_callout);
        map.insert("Card", render_card);
        map.insert("Cards", |_: &Props, children: &str| {
            format!(r#"<div class="cards">{}</div>"#, children)
        });

        let author = config.author.clone();
        let github = config.github.clone();
        let email = config.email.clone();
        let showcase = move |props: &Props, children: &str| {
            render_showcase(&author, &github, &email, props, children)
        };
        map.insert("FranckShowcase", showcase.clone());
        map.insert("Showcase", showcase);
        map
    }

    /// Register or replace a component
    pub fn insert<C: Component + 'static>(&mut self, name: &str, component: C) -> &mut Self {
        self.components.insert(name.to_string(), Box::new(component));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(|k| k.as_str())
    }

    /// Render a component, or `None` when no component has this name
    pub fn render(&self, name: &str, props: &Props, children: &str) -> Option<String> {
        self.components
            .get(name)
            .map(|c| c.render(props, children))
    }
}

impl Default for ComponentMap {
    fn default() -> Self {
        Self::with_defaults(&SiteConfig::default())
    }
}

fn render_callout(props: &Props, children: &str) -> String {
    let kind = match props.get("type").map(|s| s.as_str()) {
        Some("warn") | Some("warning") => "warn",
        Some("error") | Some("danger") => "error",
        Some("success") => "success",
        _ => "info",
    };
    let title = props
        .get("title")
        .map(|t| format!(r#"<p class="callout-title">{}</p>"#, html_escape(t)))
        .unwrap_or_default();
    format!(
        r#"<div class="callout callout-{}" role="note">{}<div class="callout-body">{}</div></div>"#,
        kind, title, children
    )
}

fn render_card(props: &Props, children: &str) -> String {
    let mut inner = String::new();
    if let Some(title) = props.get("title") {
        inner.push_str(&format!(r#"<h3 class="card-title">{}</h3>"#, html_escape(title)));
    }
    if let Some(desc) = props.get("description") {
        inner.push_str(&format!(
            r#"<p class="card-description">{}</p>"#,
            html_escape(desc)
        ));
    }
    inner.push_str(children);

    match props.get("href") {
        Some(href) => format!(
            r#"<a class="card" href="{}">{}</a>"#,
            html_escape(href),
            inner
        ),
        None => format!(r#"<div class="card">{}</div>"#, inner),
    }
}

fn render_showcase(author: &str, github: &str, email: &str, props: &Props, children: &str) -> String {
    let role = props
        .get("role")
        .map(|r| html_escape(r))
        .unwrap_or_else(|| "Security researcher".to_string());
    let mut links = String::new();
    if !github.is_empty() {
        links.push_str(&format!(
            r#"<a href="{}" target="_blank" rel="noopener">GitHub</a>"#,
            html_escape(github)
        ));
    }
    if !email.is_empty() {
        links.push_str(&format!(
            r#"<a href="mailto:{0}">{0}</a>"#,
            html_escape(email)
        ));
    }
    format!(
        r#"<section class="showcase"><h2 class="showcase-name">{}</h2><p class="showcase-role">{}</p>{}<nav class="showcase-links">{}</nav></section>"#,
        html_escape(author),
        role,
        children,
        links
    )
}

/// A piece of MDX source
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment<'a> {
    Markdown(&'a str),
    Component {
        name: String,
        props: Props,
        children: Option<&'a str>,
    },
}

lazy_static! {
    static ref OPEN_TAG: Regex = Regex::new(
        r#"^<([A-Z][A-Za-z0-9_.]*)((?:\s+[A-Za-z_][-A-Za-z0-9_:]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^}]*\}))?)*)\s*(/?)>"#
    )
    .unwrap();
    static ref ATTR: Regex = Regex::new(
        r#"([A-Za-z_][-A-Za-z0-9_:]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}))?"#
    )
    .unwrap();
}

/// Split MDX source into markdown runs and block-level components.
///
/// Components are only recognised at the start of a line and outside fenced
/// code. Top-level `import`/`export` statements are dropped.
pub(crate) fn split_segments(source: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut md_start = 0;
    let mut fence: Option<&str> = None;

    while pos < source.len() {
        let eol = source[pos..]
            .find('\n')
            .map(|i| pos + i + 1)
            .unwrap_or(source.len());
        let line = &source[pos..eol];
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            pos = eol;
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            pos = eol;
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            pos = eol;
            continue;
        }

        if line.starts_with("import ") || line.starts_with("export ") {
            push_markdown(&mut segments, &source[md_start..pos]);
            pos = eol;
            md_start = eol;
            continue;
        }

        let tag_start = pos + (line.len() - trimmed.len());
        if let Some((segment, end)) = parse_component(source, tag_start) {
            push_markdown(&mut segments, &source[md_start..pos]);
            segments.push(segment);
            pos = end;
            md_start = end;
            continue;
        }

        pos = eol;
    }

    push_markdown(&mut segments, &source[md_start..]);
    segments
}

fn push_markdown<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.trim().is_empty() {
        segments.push(Segment::Markdown(text));
    }
}

fn parse_component(source: &str, start: usize) -> Option<(Segment<'_>, usize)> {
    let caps = OPEN_TAG.captures(&source[start..])?;
    let name = caps.get(1)?.as_str().to_string();
    let props = parse_props(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
    let open_end = start + caps.get(0)?.end();

    if caps.get(3).is_some_and(|m| m.as_str() == "/") {
        let segment = Segment::Component {
            name,
            props,
            children: None,
        };
        return Some((segment, open_end));
    }

    let Some((close_start, close_end)) = find_closing(source, open_end, &name) else {
        tracing::warn!("Unclosed <{}> component, rendering as markdown", name);
        return None;
    };
    let segment = Segment::Component {
        name,
        props,
        children: Some(&source[open_end..close_start]),
    };
    Some((segment, close_end))
}

/// Locate `</name>` matching an opening tag, honouring nested same-name tags
fn find_closing(source: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let open = format!("<{}", name);
    let close = format!("</{}>", name);
    let mut depth = 1;
    let mut pos = from;

    loop {
        let next_open = source[pos..].find(&open).map(|i| pos + i);
        let next_close = source[pos..].find(&close).map(|i| pos + i)?;

        match next_open {
            Some(o) if o < next_close => {
                let after = source[o + open.len()..].chars().next();
                let is_tag = matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/');
                let tag_end = source[o..].find('>').map(|i| o + i)?;
                if is_tag && !source[..tag_end].ends_with('/') {
                    depth += 1;
                }
                pos = tag_end + 1;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some((next_close, next_close + close.len()));
                }
                pos = next_close + close.len();
            }
        }
    }
}

fn parse_props(attrs: &str) -> Props {
    let mut props = Props::new();
    for caps in ATTR.captures_iter(attrs) {
        let key = caps[1].to_string();
        let value = if let Some(v) = caps.get(2).or_else(|| caps.get(3)) {
            v.as_str().to_string()
        } else if let Some(expr) = caps.get(4) {
            unquote_expression(expr.as_str())
        } else {
            "true".to_string()
        };
        props.insert(key, value);
    }
    props
}

/// `{"text"}`, `{'text'}` and `` {`text`} `` become `text`; other expressions stay verbatim
fn unquote_expression(expr: &str) -> String {
    let expr = expr.trim();
    for quote in ['"', '\'', '`'] {
        if expr.len() >= 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            return expr[1..expr.len() - 1].to_string();
        }
    }
    expr.to_string()
}
