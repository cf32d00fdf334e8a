//! Site configuration (_config.yml)

use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub keywords: Option<Vec<String>>,
    /// Site owner, used whenever a post has no author
    pub author: String,
    pub email: String,
    pub github: String,
    pub linkedin: String,
    pub language: String,
    /// IANA timezone used to read naive front-matter dates
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    /// Route segment of the blog section (`/blog`)
    pub blog_route: String,

    // Directory
    pub content_dir: String,
    pub blog_dir: String,
    pub pages_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Writing
    pub render_drafts: bool,
    pub reading_speed: u32,
    pub excerpt_length: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Feed
    pub feed_limit: usize,

    // Navigation
    #[serde(default)]
    pub menu: Vec<MenuItem>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Wayko".to_string(),
            subtitle: String::new(),
            description: "Write-ups, articles techniques, réflexions et updates de projets en cybersécurité"
                .to_string(),
            keywords: None,
            author: "Franck Chevalier".to_string(),
            email: "franck@chvl.re".to_string(),
            github: "https://github.com/WaykoDev".to_string(),
            linkedin: String::new(),
            language: "fr".to_string(),
            timezone: "UTC".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            blog_route: "blog".to_string(),

            content_dir: "content".to_string(),
            blog_dir: "blog".to_string(),
            pages_dir: "pages".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            render_drafts: false,
            reading_speed: crate::helpers::WORDS_PER_MINUTE,
            excerpt_length: 150,
            highlight: HighlightConfig::default(),

            feed_limit: 20,

            menu: vec![
                MenuItem::new("Blog", "/blog"),
                MenuItem::new("About", "/about"),
                MenuItem::new("Contact", "/contact"),
            ],
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the configured timezone, falling back to UTC
    pub fn tz(&self) -> Tz {
        match self.timezone.trim() {
            "" => Tz::UTC,
            name => name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!("Unknown timezone {:?}, using UTC", name);
                Tz::UTC
            }),
        }
    }

    /// Path of the blog listing, e.g. `/blog`
    pub fn blog_base(&self) -> String {
        crate::helpers::url_for(self, &self.blog_route)
            .trim_end_matches('/')
            .to_string()
    }
}

/// A navigation entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl MenuItem {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}
