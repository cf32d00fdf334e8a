//! Show one post

use anyhow::Result;
use std::fmt::Write;

use crate::blog::PostDetail;
use crate::config::SiteConfig;
use crate::content::{ComponentMap, ContentRepository};
use crate::Site;

/// Print the details of the post at `slug_path` (e.g. `ctf/heap-overflow`)
pub fn run(site: &Site, slug_path: &str) -> Result<()> {
    let repo = site.load_content()?;
    print!("{}", render(&repo, &site.config, slug_path)?);
    Ok(())
}

pub fn render(repo: &ContentRepository, config: &SiteConfig, slug_path: &str) -> Result<String> {
    let slugs: Vec<&str> = slug_path.split('/').filter(|s| !s.is_empty()).collect();
    let components = ComponentMap::with_defaults(config);
    let post = PostDetail::resolve(repo, config, &components, &slugs)?;

    let mut out = String::new();
    writeln!(out, "{}", post.title)?;
    writeln!(out, "  url:      {}", post.url)?;
    writeln!(out, "  author:   {}", post.author)?;
    if let Some(date) = &post.date {
        writeln!(out, "  date:     {}", date)?;
    }
    writeln!(out, "  reading:  {} min de lecture", post.reading_minutes)?;
    if !post.tags.is_empty() {
        let tags: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        writeln!(out, "  tags:     {}", tags.join(", "))?;
    }
    if let Some(description) = &post.description {
        writeln!(out, "  summary:  {}", description)?;
    }
    if !post.toc.is_empty() {
        writeln!(out, "  contents:")?;
        for entry in &post.toc {
            let indent = "  ".repeat(entry.level.saturating_sub(1));
            writeln!(out, "  {}- {}", indent, entry.text)?;
        }
    }
    if let Some(older) = &post.older {
        writeln!(out, "  previous: {} ({})", older.title, older.url)?;
    }
    if let Some(newer) = &post.newer {
        writeln!(out, "  next:     {} ({})", newer.title, newer.url)?;
    }

    Ok(out)
}
