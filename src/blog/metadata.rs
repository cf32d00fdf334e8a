//! SEO metadata for blog posts

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::BlogPost;
use crate::helpers::{absolute_url, full_url_for};

/// Page-level metadata rendered into `<head>`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub authors: Vec<String>,
    pub keywords: Vec<String>,
    pub open_graph: Option<OpenGraph>,
    pub twitter: Option<TwitterCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub published_time: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

impl PageMetadata {
    /// Metadata for a post, derived from its front-matter
    pub fn for_post(post: &BlogPost, config: &SiteConfig) -> Self {
        let author = post.author_or(&config.author).to_string();
        let description = post.description.clone().unwrap_or_default();
        let images: Vec<String> = post
            .image
            .iter()
            .map(|img| full_url_for(config, img))
            .collect();

        Self {
            title: format!("{} | Blog", post.title),
            description: post
                .description
                .clone()
                .unwrap_or_else(|| format!("Article de blog par {}", author)),
            authors: vec![author.clone()],
            keywords: post.tags.clone(),
            open_graph: Some(OpenGraph {
                title: post.title.clone(),
                description: description.clone(),
                kind: "article".to_string(),
                url: Some(absolute_url(config, &post.url)),
                published_time: post.date.as_ref().and_then(|d| d.iso()),
                authors: vec![author],
                tags: post.tags.clone(),
                images: images.clone(),
            }),
            twitter: Some(TwitterCard {
                card: "summary_large_image".to_string(),
                title: post.title.clone(),
                description,
                images,
            }),
        }
    }

    /// Metadata for a site page (listing, static pages, home)
    pub fn for_page(title: &str, description: Option<&str>, config: &SiteConfig) -> Self {
        let title = if title.is_empty() || title == config.title {
            config.title.clone()
        } else {
            format!("{} | {}", title, config.title)
        };
        Self {
            title,
            description: description.unwrap_or(&config.description).to_string(),
            authors: vec![config.author.clone()],
            keywords: config.keywords.clone().unwrap_or_default(),
            open_graph: None,
            twitter: None,
        }
    }
}
