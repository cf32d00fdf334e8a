//! Content loader - builds the content repository from the source tree

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use super::{BlogPost, ContentError, FrontMatter, MarkdownRenderer, MdxBody, PostDate, StaticPage};
use crate::helpers::reading_time_at;
use crate::Site;

/// All blog posts and static pages of a site.
///
/// Built once per generation or server reload and passed by reference.
#[derive(Debug, Default)]
pub struct ContentRepository {
    posts: Vec<BlogPost>,
    pages: Vec<StaticPage>,
    by_slug: HashMap<String, usize>,
}

impl ContentRepository {
    /// Load posts and pages from the site's content directory
    pub fn load(site: &Site) -> Result<Self> {
        let renderer = Arc::new(MarkdownRenderer::with_options(
            &site.config.highlight.theme,
            site.config.highlight.line_number,
        ));
        let loader = ContentLoader { site, renderer };

        let posts = loader.load_posts()?;
        let pages = loader.load_pages()?;
        tracing::info!("Loaded {} posts and {} pages", posts.len(), pages.len());

        Ok(Self::from_parts(posts, pages))
    }

    /// Build a repository from already loaded posts, in collection order
    pub fn from_posts(posts: Vec<BlogPost>) -> Self {
        Self::from_parts(posts, Vec::new())
    }

    fn from_parts(posts: Vec<BlogPost>, mut pages: Vec<StaticPage>) -> Self {
        let mut by_slug = HashMap::new();
        let mut unique = Vec::with_capacity(posts.len());

        for post in posts {
            let key = post.slug_path();
            if by_slug.contains_key(&key) {
                tracing::warn!(
                    "Duplicate slug {:?} from {}, keeping the first document",
                    key,
                    post.source
                );
                continue;
            }
            by_slug.insert(key, unique.len());
            unique.push(post);
        }

        // Stable: equal dates keep collection order
        unique.sort_by(|a: &BlogPost, b: &BlogPost| b.sort_key().cmp(&a.sort_key()));
        for (i, post) in unique.iter().enumerate() {
            by_slug.insert(post.slug_path(), i);
        }

        pages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.slug.cmp(&b.slug)));

        Self {
            posts: unique,
            pages,
            by_slug,
        }
    }

    /// All posts, most recent first
    pub fn list_posts(&self) -> &[BlogPost] {
        &self.posts
    }

    /// Resolve a post by slug path
    pub fn get_post<S: AsRef<str>>(&self, slugs: &[S]) -> Result<&BlogPost, ContentError> {
        let key = slugs
            .iter()
            .map(|s| s.as_ref().trim_matches('/'))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        self.by_slug
            .get(&key)
            .map(|&i| &self.posts[i])
            .ok_or_else(|| ContentError::not_found(slugs))
    }

    /// Posts carrying `tag` (exact match)
    pub fn posts_by_tag(&self, tag: &str) -> Vec<&BlogPost> {
        self.posts.iter().filter(|p| p.has_tag(tag)).collect()
    }

    /// Neighbours of a post in date order: (older, newer)
    pub fn neighbours(&self, post: &BlogPost) -> (Option<&BlogPost>, Option<&BlogPost>) {
        let Some(&i) = self.by_slug.get(&post.slug_path()) else {
            return (None, None);
        };
        let older = self.posts.get(i + 1);
        let newer = i.checked_sub(1).and_then(|j| self.posts.get(j));
        (older, newer)
    }

    /// Static pages in navigation order
    pub fn pages(&self) -> &[StaticPage] {
        &self.pages
    }

    /// Resolve a static page by route segment (`""` for the home page)
    pub fn get_page(&self, slug: &str) -> Option<&StaticPage> {
        let slug = slug.trim_matches('/');
        self.pages.iter().find(|p| p.slug == slug)
    }
}

struct ContentLoader<'a> {
    site: &'a Site,
    renderer: Arc<MarkdownRenderer>,
}

impl ContentLoader<'_> {
    /// Load every document of the blog collection, in file-name order
    fn load_posts(&self) -> Result<Vec<BlogPost>> {
        let blog_dir = &self.site.blog_dir;
        if !blog_dir.exists() {
            tracing::debug!("No blog directory at {:?}", blog_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(blog_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_content_file(path) {
                continue;
            }

            match self.load_post(path) {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => tracing::debug!("Skipping draft {:?}", path),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        Ok(posts)
    }

    /// Load a single post; `None` for drafts that are not rendered
    fn load_post(&self, path: &Path) -> Result<Option<BlogPost>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.draft && !self.site.config.render_drafts {
            return Ok(None);
        }

        let relative = path.strip_prefix(&self.site.blog_dir).unwrap_or(path);
        let slugs = slugs_for(relative);
        let url = if slugs.is_empty() {
            self.site.config.blog_base()
        } else {
            format!("{}/{}", self.site.config.blog_base(), slugs.join("/"))
        };

        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| file_stem(path));

        let date = fm.date.as_deref().map(|raw| {
            let date = PostDate::parse(raw, self.site.config.tz());
            if date.parsed.is_none() {
                tracing::warn!("Unparseable date {:?} in {:?}, sorting as oldest", raw, path);
            }
            date
        });

        let mut post = BlogPost::new(
            slugs,
            url,
            title,
            MdxBody::new(body, self.renderer.clone()).into_body(),
        );
        post.description = fm.description;
        post.author = fm.author;
        post.date = date;
        post.tags = fm.tags;
        post.image = fm.image;
        post.excerpt = fm.excerpt;
        post.reading_minutes = reading_time_at(body, self.site.config.reading_speed);
        post.source = self.relative_source(path);

        Ok(Some(post))
    }

    /// Load the static pages (one level, `index.md` is the home page)
    fn load_pages(&self) -> Result<Vec<StaticPage>> {
        let pages_dir = &self.site.pages_dir;
        if !pages_dir.exists() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(pages_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_content_file(path) {
                continue;
            }

            match self.load_page(path) {
                Ok(page) => pages.push(page),
                Err(e) => tracing::warn!("Failed to load page {:?}: {}", path, e),
            }
        }

        Ok(pages)
    }

    fn load_page(&self, path: &Path) -> Result<StaticPage> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let stem = file_stem(path);
        let slug = if stem == "index" { String::new() } else { stem };
        let url = crate::helpers::url_for(&self.site.config, &slug);
        let title = fm.title.unwrap_or_else(|| file_stem(path));

        Ok(StaticPage {
            title,
            description: fm.description,
            layout: fm.layout.unwrap_or_else(|| "page".to_string()),
            order: fm.order.unwrap_or(i64::MAX),
            slug,
            url,
            source: self.relative_source(path),
            body: MdxBody::new(body, self.renderer.clone()).into_body(),
        })
    }

    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Path segments of a document relative to the collection root.
///
/// The extension is dropped, and so is a trailing `index` segment.
fn slugs_for(relative: &Path) -> Vec<String> {
    let mut slugs: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .map(|s| s.to_string())
        .collect();
    if slugs.last().is_some_and(|s| s == "index") {
        slugs.pop();
    }
    slugs
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

/// Check if a file is a markdown or MDX document
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::post;
    use std::path::PathBuf;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site_in(dir: &Path) -> Site {
        Site::new(dir).unwrap()
    }

    #[test]
    fn test_slugs_for() {
        assert_eq!(slugs_for(Path::new("hello.mdx")), vec!["hello"]);
        assert_eq!(slugs_for(Path::new("ctf/2024/pwn.md")), vec!["ctf", "2024", "pwn"]);
        assert_eq!(slugs_for(Path::new("ctf/index.mdx")), vec!["ctf"]);
        assert!(slugs_for(&PathBuf::from("index.md")).is_empty());
    }

    #[test]
    fn test_list_posts_sorted_by_date_descending() {
        let repo = ContentRepository::from_posts(vec![
            post("old", "Old", &[], Some("2023-01-01")),
            post("new", "New", &[], Some("2024-06-01")),
            post("mid", "Mid", &[], Some("2023-09-12")),
        ]);
        let titles: Vec<_> = repo.list_posts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid", "Old"]);

        let keys: Vec<_> = repo.list_posts().iter().map(|p| p.sort_key()).collect();
        assert!(keys.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_is_stable_for_equal_and_missing_dates() {
        let repo = ContentRepository::from_posts(vec![
            post("a", "A", &[], Some("2024-01-01")),
            post("nodate", "NoDate", &[], None),
            post("b", "B", &[], Some("2024-01-01")),
            post("bad", "BadDate", &[], Some("not-a-date")),
            post("c", "C", &[], Some("2024-01-01")),
        ]);
        let titles: Vec<_> = repo.list_posts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "NoDate", "BadDate"]);
    }

    #[test]
    fn test_get_post_and_not_found() {
        let repo = ContentRepository::from_posts(vec![post("hello", "Hello", &[], None)]);
        assert_eq!(repo.get_post(&["hello"]).unwrap().title, "Hello");
        assert_eq!(repo.get_post(&["/hello/"]).unwrap().title, "Hello");

        let err = repo.get_post(&["missing", "post"]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no post found at `missing/post`");
    }

    #[test]
    fn test_duplicate_slugs_keep_first() {
        let repo = ContentRepository::from_posts(vec![
            post("same", "First", &[], Some("2020-01-01")),
            post("same", "Second", &[], Some("2024-01-01")),
        ]);
        assert_eq!(repo.list_posts().len(), 1);
        assert_eq!(repo.get_post(&["same"]).unwrap().title, "First");
    }

    #[test]
    fn test_posts_by_tag_and_neighbours() {
        let repo = ContentRepository::from_posts(vec![
            post("one", "One", &["web"], Some("2024-03-01")),
            post("two", "Two", &["ctf"], Some("2024-02-01")),
            post("three", "Three", &["web", "ctf"], Some("2024-01-01")),
        ]);
        let web: Vec<_> = repo.posts_by_tag("web").iter().map(|p| p.title.as_str()).collect();
        assert_eq!(web, vec!["One", "Three"]);
        assert!(repo.posts_by_tag("Web").is_empty());

        let two = repo.get_post(&["two"]).unwrap();
        let (older, newer) = repo.neighbours(two);
        assert_eq!(older.unwrap().title, "Three");
        assert_eq!(newer.unwrap().title, "One");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "content/blog/iconv.mdx",
            "---\ntitle: iconv\ndate: 2024-05-27\ntags: [web, vulnerability]\n---\n\nimport X from './x'\n\n# Exploit\n",
        );
        write(
            root,
            "content/blog/ctf/index.md",
            "---\ntitle: CTF notes\ndate: 2023-11-02\nauthor: Guest\n---\nnotes",
        );
        write(root, "content/blog/draft.md", "---\ntitle: WIP\ndraft: true\n---\n");
        write(root, "content/blog/broken.md", "---\ntitle: [oops\ntags: x\n---\n");
        write(root, "content/blog/notes.txt", "ignored");
        write(
            root,
            "content/pages/about.md",
            "---\ntitle: About\norder: 1\n---\nHi",
        );
        write(
            root,
            "content/pages/contact.md",
            "---\ntitle: Contact\nlayout: contact\norder: 2\n---\n",
        );

        let repo = site_in(root).load_content().unwrap();
        let posts = repo.list_posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "iconv");
        assert_eq!(posts[0].url, "/blog/iconv");
        assert_eq!(posts[0].tags, vec!["web", "vulnerability"]);
        assert_eq!(posts[0].source, "blog/iconv.mdx");
        assert_eq!(posts[1].slugs, vec!["ctf"]);
        assert_eq!(posts[1].url, "/blog/ctf");
        assert_eq!(posts[1].author.as_deref(), Some("Guest"));

        let html = posts[0].render_body(&crate::content::ComponentMap::default()).unwrap();
        assert!(html.contains("<h1 id=\"exploit\">Exploit</h1>"));
        assert!(!html.contains("import"));

        let pages = repo.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].slug, "about");
        assert_eq!(pages[0].url, "/about");
        assert_eq!(pages[1].layout, "contact");
        assert!(repo.get_page("/contact").is_some());
    }

    #[test]
    fn test_missing_content_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = site_in(dir.path()).load_content().unwrap();
        assert!(repo.list_posts().is_empty());
        assert!(repo.pages().is_empty());
    }
}
