//! Create a new post or page

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Create a new post (`content/blog/<slug>.mdx`) or page (`content/pages/<slug>.md`).
///
/// `path` overrides the slugified title and may contain sub-directories.
pub fn create_post(site: &Site, title: &str, layout: &str, path: Option<&str>) -> Result<PathBuf> {
    let name = match path {
        Some(p) => p.trim_matches('/').to_string(),
        None => slug::slugify(title),
    };
    if name.is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}", title);
    }

    let title_yaml = serde_yaml::to_string(title)?;
    let title_yaml = title_yaml.trim_end();

    let (file_path, content) = match layout {
        "page" => (
            site.pages_dir.join(format!("{}.md", name)),
            format!(
                "---\ntitle: {}\ndescription: ''\nlayout: page\n---\n\n",
                title_yaml
            ),
        ),
        "post" | "draft" => {
            let now = chrono::Local::now();
            let draft = if layout == "draft" { "draft: true\n" } else { "" };
            (
                site.blog_dir.join(format!("{}.mdx", name)),
                format!(
                    "---\ntitle: {}\ndescription: ''\ndate: {}\ntags: []\n{}---\n\n",
                    title_yaml,
                    now.format("%Y-%m-%d"),
                    draft
                ),
            )
        }
        other => anyhow::bail!("Unknown layout: {}. Available: post, draft, page", other),
    };

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_post_is_loadable() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post(&site, "Heap: House of Force", "post", None).unwrap();
        assert_eq!(path, site.blog_dir.join("heap-house-of-force.mdx"));

        let repo = site.load_content().unwrap();
        let post = repo.get_post(&["heap-house-of-force"]).unwrap();
        assert_eq!(post.title, "Heap: House of Force");
        assert!(post.date.as_ref().unwrap().parsed.is_some());
    }

    #[test]
    fn test_new_draft_is_hidden() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        create_post(&site, "WIP", "draft", None).unwrap();
        assert!(site.load_content().unwrap().list_posts().is_empty());
    }

    #[test]
    fn test_new_page_with_path() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let path = create_post(&site, "Politique de divulgation", "page", Some("disclosure")).unwrap();
        assert_eq!(path, site.pages_dir.join("disclosure.md"));

        let repo = site.load_content().unwrap();
        assert_eq!(repo.get_page("disclosure").unwrap().title, "Politique de divulgation");
    }

    #[test]
    fn test_new_refuses_overwrite_and_unknown_layout() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        create_post(&site, "Same", "post", None).unwrap();
        assert!(create_post(&site, "Same", "post", None).is_err());
        assert!(create_post(&site, "Other", "archive", None).is_err());
    }
}
