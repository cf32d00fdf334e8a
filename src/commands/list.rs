//! List site content

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::blog::{build_tag_index, filter_posts, FilterState};
use crate::content::{serialize_all, ContentRepository};
use crate::Site;

/// List site content by type, optionally filtered like the blog listing
pub fn run(site: &Site, content_type: &str, filter: &FilterState) -> Result<()> {
    let repo = site.load_content()?;
    print!("{}", render(&repo, content_type, filter)?);
    Ok(())
}

pub fn render(repo: &ContentRepository, content_type: &str, filter: &FilterState) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = serialize_all(repo.list_posts());
            let visible = filter_posts(filter, &posts);
            if filter.is_active() {
                writeln!(out, "Posts ({} / {}):", visible.len(), posts.len())?;
            } else {
                writeln!(out, "Posts ({}):", posts.len())?;
            }
            for (post, full) in visible.iter().filter_map(|p| {
                repo.get_post(&p.slugs).ok().map(|full| (p, full))
            }) {
                let date = full
                    .date
                    .as_ref()
                    .and_then(|d| d.parsed)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                write!(out, "  {} - {} [{}]", date, post.title, full.source)?;
                if !post.tags.is_empty() {
                    write!(out, " #{}", post.tags.join(" #"))?;
                }
                writeln!(out)?;
            }
            if visible.is_empty() && !posts.is_empty() {
                writeln!(out, "  Aucun article trouvé")?;
            }
        }
        "page" | "pages" => {
            writeln!(out, "Pages ({}):", repo.pages().len())?;
            for page in repo.pages() {
                writeln!(out, "  {} -> {} [{}]", page.title, page.url, page.source)?;
            }
        }
        "tag" | "tags" => {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for tag in build_tag_index(repo.list_posts()) {
                let count = repo.posts_by_tag(&tag).len();
                counts.insert(tag, count);
            }
            writeln!(out, "Tags ({}):", counts.len())?;
            let mut tags: Vec<_> = counts.into_iter().collect();
            // Stable sort keeps the alphabetical order among equal counts
            tags.sort_by(|a, b| b.1.cmp(&a.1));
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, page, tag", content_type);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::post;

    fn repo() -> ContentRepository {
        ContentRepository::from_posts(vec![
            post("alpha", "Alpha breach", &["web", "pentest"], Some("2024-02-01")),
            post("beta", "Beta ctf", &["ctf", "web"], Some("2024-01-01")),
            post("gamma", "Gamma", &[], None),
        ])
    }

    #[test]
    fn test_list_posts() {
        let out = render(&repo(), "post", &FilterState::default()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Posts (3):");
        assert!(lines[1].starts_with("  2024-02-01 - Alpha breach"));
        assert!(lines[1].ends_with("#web #pentest"));
        assert!(lines[3].starts_with("  ---------- - Gamma"));
    }

    #[test]
    fn test_list_posts_filtered() {
        let out = render(&repo(), "posts", &FilterState::from_query(Some("ctf"))).unwrap();
        assert!(out.starts_with("Posts (1 / 3):"));
        assert!(out.contains("Beta ctf"));
        assert!(!out.contains("Alpha"));

        let mut filter = FilterState::default();
        filter.set_query("kernel");
        let out = render(&repo(), "post", &filter).unwrap();
        assert!(out.contains("Aucun article trouvé"));
    }

    #[test]
    fn test_list_tags() {
        let out = render(&repo(), "tag", &FilterState::default()).unwrap();
        assert_eq!(out, "Tags (3):\n  web (2)\n  ctf (1)\n  pentest (1)\n");
    }

    #[test]
    fn test_unknown_type() {
        assert!(render(&repo(), "category", &FilterState::default()).is_err());
    }
}
