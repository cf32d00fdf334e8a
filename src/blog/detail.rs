//! Blog post detail view

use anyhow::Result;
use serde::Serialize;

use super::PageMetadata;
use crate::config::SiteConfig;
use crate::content::{BlogPost, ComponentMap, ContentRepository};
use crate::helpers::{get_tag_color, tag_url, toc, TocEntry};

/// A tag badge linking back to the filtered listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub color: &'static str,
    pub url: String,
    pub active: bool,
}

impl TagLink {
    pub fn new(tag: &str, config: &SiteConfig, active: bool) -> Self {
        Self {
            name: tag.to_string(),
            color: get_tag_color(tag),
            url: tag_url(config, tag),
            active,
        }
    }
}

/// Link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostLink {
    pub title: String,
    pub url: String,
}

impl From<&BlogPost> for PostLink {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            url: post.url.clone(),
        }
    }
}

/// A fully resolved post, ready for the post template
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub reading_minutes: u32,
    pub image: Option<String>,
    pub tags: Vec<TagLink>,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub older: Option<PostLink>,
    pub newer: Option<PostLink>,
    pub meta: PageMetadata,
}

impl PostDetail {
    /// Resolve `slugs` and render the post body.
    ///
    /// Fails with `ContentError::NotFound` when no post has that slug path.
    pub fn resolve<S: AsRef<str>>(
        repo: &ContentRepository,
        config: &SiteConfig,
        components: &ComponentMap,
        slugs: &[S],
    ) -> Result<Self> {
        let post = repo.get_post(slugs)?;
        Self::from_post(repo, post, config, components)
    }

    pub fn from_post(
        repo: &ContentRepository,
        post: &BlogPost,
        config: &SiteConfig,
        components: &ComponentMap,
    ) -> Result<Self> {
        let html = post.render_body(components)?;
        let (older, newer) = repo.neighbours(post);

        Ok(Self {
            url: post.url.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            author: post.author_or(&config.author).to_string(),
            date: post.date.as_ref().and_then(|d| d.formatted()),
            datetime: post.date.as_ref().and_then(|d| d.iso()),
            reading_minutes: post.reading_minutes,
            image: post.image.clone(),
            tags: post
                .tags
                .iter()
                .map(|t| TagLink::new(t, config, false))
                .collect(),
            toc: toc(&html, 3),
            html,
            older: older.map(PostLink::from),
            newer: newer.map(PostLink::from),
            meta: PageMetadata::for_post(post, config),
        })
    }

    /// Metadata for a slug path; empty when no post matches
    pub fn metadata<S: AsRef<str>>(
        repo: &ContentRepository,
        config: &SiteConfig,
        slugs: &[S],
    ) -> PageMetadata {
        repo.get_post(slugs)
            .map(|post| PageMetadata::for_post(post, config))
            .unwrap_or_default()
    }
}
