//! wayko-site: static site generator for the Wayko security blog
//!
//! Loads an MDX/Markdown blog collection and a handful of static pages,
//! renders them with embedded Tera templates and serves the result locally.

pub mod blog;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (`content/`)
    pub content_dir: PathBuf,
    /// Blog collection directory (`content/blog/`)
    pub blog_dir: PathBuf,
    /// Static pages directory (`content/pages/`)
    pub pages_dir: PathBuf,
    /// Assets copied verbatim (`static/`)
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let blog_dir = content_dir.join(&config.blog_dir);
        let pages_dir = content_dir.join(&config.pages_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            blog_dir,
            pages_dir,
            static_dir,
            public_dir,
        }
    }

    /// Load the content repository
    pub fn load_content(&self) -> Result<content::ContentRepository> {
        content::ContentRepository::load(self)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
