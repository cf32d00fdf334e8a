//! Built-in wayko theme using the Tera template engine
//!
//! Every template is embedded in the binary; a site only provides content.

use anyhow::Result;
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::blog::{ListingView, PageMetadata, PostCard, PostDetail};
use crate::config::SiteConfig;
use crate::helpers::url_for;

/// Theme stylesheet, written to `css/style.css` unless the site ships its own
pub const STYLESHEET: &str = include_str!("wayko/css/style.css");

/// Template renderer with the embedded wayko theme
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    livereload: bool,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Body HTML is produced by the markdown renderer; templates escape
        // front-matter text explicitly with `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("wayko/layout.html")),
            ("home.html", include_str!("wayko/home.html")),
            ("blog.html", include_str!("wayko/blog.html")),
            ("post.html", include_str!("wayko/post.html")),
            ("page.html", include_str!("wayko/page.html")),
            ("contact.html", include_str!("wayko/contact.html")),
            ("404.html", include_str!("wayko/404.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("wayko/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("wayko/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("wayko/partials/footer.html"),
            ),
            ("partials/card.html", include_str!("wayko/partials/card.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self {
            tera,
            site: SiteData::from_config(config),
            livereload: false,
        })
    }

    /// Inject the live-reload client into every page
    pub fn with_livereload(mut self, enabled: bool) -> Self {
        self.livereload = enabled;
        self
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Context shared by every page
    fn base_context(&self, meta: &PageMetadata, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("meta", meta);
        context.insert("current_path", current_path);
        context.insert("year", &Utc::now().year());
        context.insert("livereload", &self.livereload);
        context
    }

    pub fn render_home(
        &self,
        meta: &PageMetadata,
        latest: &[PostCard],
        page: Option<&PageData>,
    ) -> Result<String> {
        let mut context = self.base_context(meta, "/");
        context.insert("latest", latest);
        if let Some(page) = page {
            context.insert("page", page);
        }
        self.render("home.html", &context)
    }

    pub fn render_listing(&self, meta: &PageMetadata, listing: &ListingView) -> Result<String> {
        let mut context = self.base_context(meta, &self.site.blog_url);
        context.insert("listing", listing);
        self.render("blog.html", &context)
    }

    pub fn render_post(&self, post: &PostDetail) -> Result<String> {
        let mut context = self.base_context(&post.meta, &post.url);
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// Render a static page with the template named by its layout
    pub fn render_page(&self, meta: &PageMetadata, page: &PageData) -> Result<String> {
        let template = match page.layout.as_str() {
            "contact" => "contact.html",
            _ => "page.html",
        };
        let mut context = self.base_context(meta, &page.url);
        context.insert("page", page);
        self.render(template, &context)
    }

    pub fn render_not_found(&self, meta: &PageMetadata) -> Result<String> {
        let context = self.base_context(meta, "/404.html");
        self.render("404.html", &context)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub github: String,
    pub linkedin: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub blog_url: String,
    pub menu: Vec<MenuLink>,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            email: config.email.clone(),
            github: config.github.clone(),
            linkedin: config.linkedin.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            blog_url: config.blog_base(),
            menu: config
                .menu
                .iter()
                .map(|item| MenuLink {
                    name: item.name.clone(),
                    url: url_for(config, &item.path),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuLink {
    pub name: String,
    pub url: String,
}

/// A rendered static page
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub description: Option<String>,
    pub layout: String,
    pub url: String,
    pub html: String,
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}
