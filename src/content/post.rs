//! Blog post and page models

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{Body, ComponentMap};
use crate::helpers::{format_date, iso_string, parse_date_string};

/// A front-matter date as authored, with its parsed value when valid
#[derive(Debug, Clone, PartialEq)]
pub struct PostDate {
    pub raw: String,
    pub parsed: Option<DateTime<FixedOffset>>,
}

impl PostDate {
    pub fn parse(raw: &str, tz: Tz) -> Self {
        Self {
            raw: raw.trim().to_string(),
            parsed: parse_date_string(raw, tz),
        }
    }

    /// Milliseconds since the epoch; unparseable dates sort as epoch zero
    pub fn timestamp_millis(&self) -> i64 {
        self.parsed.map(|d| d.timestamp_millis()).unwrap_or(0)
    }

    /// Long French form, e.g. "15 janvier 2024"
    pub fn formatted(&self) -> Option<String> {
        self.parsed.as_ref().map(format_date)
    }

    /// ISO 8601 in UTC, for `datetime` attributes and Open Graph
    pub fn iso(&self) -> Option<String> {
        self.parsed.as_ref().map(iso_string)
    }
}

/// A blog post loaded from the content collection
#[derive(Debug, Clone)]
pub struct BlogPost {
    /// Canonical path, e.g. `/blog/ctf/heap-overflow`
    pub url: String,
    /// Path segments identifying the post
    pub slugs: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date: Option<PostDate>,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    /// Estimated reading time in minutes
    pub reading_minutes: u32,
    /// Source file path relative to the content directory
    pub source: String,
    pub body: Body,
}

impl BlogPost {
    /// Create a post with the required fields; optional ones start empty
    pub fn new(slugs: Vec<String>, url: String, title: String, body: Body) -> Self {
        Self {
            url,
            slugs,
            title,
            description: None,
            author: None,
            date: None,
            tags: Vec::new(),
            image: None,
            excerpt: None,
            reading_minutes: 1,
            source: String::new(),
            body,
        }
    }

    /// Sort key: date timestamp, or 0 when the date is missing or invalid
    pub fn sort_key(&self) -> i64 {
        self.date.as_ref().map(|d| d.timestamp_millis()).unwrap_or(0)
    }

    /// The post author, or `fallback` when none was authored
    pub fn author_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.author.as_deref().unwrap_or(fallback)
    }

    /// Slug path joined with `/`
    pub fn slug_path(&self) -> String {
        self.slugs.join("/")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Render the body to HTML
    pub fn render_body(&self, components: &ComponentMap) -> Result<String> {
        let mut out = String::new();
        self.body.render_into(&mut out, components)?;
        Ok(out)
    }
}

/// Plain-data projection of a `BlogPost`, safe to embed as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableBlogPost {
    pub url: String,
    pub slugs: Vec<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Project a post onto its serializable fields, dropping the body
pub fn serialize(post: &BlogPost) -> SerializableBlogPost {
    SerializableBlogPost {
        url: post.url.clone(),
        slugs: post.slugs.clone(),
        title: post.title.clone(),
        description: post.description.clone(),
        author: post.author.clone(),
        date: post.date.as_ref().map(|d| d.raw.clone()),
        tags: post.tags.clone(),
        image: post.image.clone(),
        excerpt: post.excerpt.clone(),
    }
}

pub fn serialize_all(posts: &[BlogPost]) -> Vec<SerializableBlogPost> {
    posts.iter().map(serialize).collect()
}

/// A standalone content page (about, contact, disclosure policy, ...)
#[derive(Debug, Clone)]
pub struct StaticPage {
    pub title: String,
    pub description: Option<String>,
    /// `page` or `contact`
    pub layout: String,
    pub order: i64,
    /// Route segment, e.g. `disclosure-policy`; empty for the home page
    pub slug: String,
    pub url: String,
    pub source: String,
    pub body: Body,
}

impl StaticPage {
    pub fn is_home(&self) -> bool {
        self.slug.is_empty()
    }

    pub fn render_body(&self, components: &ComponentMap) -> Result<String> {
        let mut out = String::new();
        self.body.render_into(&mut out, components)?;
        Ok(out)
    }
}
