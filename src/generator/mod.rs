//! Generator module - renders the site to static HTML with the built-in templates

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::blog::{FilterState, ListingView, PageMetadata, PostCard, PostDetail};
use crate::content::{serialize, BlogPost, ComponentMap, ContentRepository, StaticPage};
use crate::helpers::{absolute_url, date_xml, escape_xml, excerpt, strip_html};
use crate::templates::{PageData, TemplateRenderer, STYLESHEET};
use crate::Site;

/// Number of cards on the home page
const HOME_POSTS: usize = 3;

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    components: ComponentMap,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new(&site.config)?,
            components: ComponentMap::with_defaults(&site.config),
        })
    }

    /// Inject the live-reload client into rendered pages
    pub fn with_livereload(mut self, enabled: bool) -> Self {
        self.renderer = self.renderer.with_livereload(enabled);
        self
    }

    /// Generate the entire site
    pub fn generate(&self, repo: &ContentRepository) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.copy_static_assets()?;
        self.write_stylesheet()?;

        self.write_html("", &self.render_home(repo)?)?;
        self.write_html(
            &self.site.config.blog_base(),
            &self.render_listing(repo, FilterState::default())?,
        )?;
        self.generate_post_pages(repo)?;
        self.generate_page_pages(repo)?;

        fs::write(self.site.public_dir.join("404.html"), self.render_not_found()?)?;
        tracing::debug!("Generated 404.html");

        self.generate_atom_feed(repo)?;
        self.generate_search_index(repo)?;

        Ok(())
    }

    pub fn render_home(&self, repo: &ContentRepository) -> Result<String> {
        let config = &self.site.config;
        let latest: Vec<PostCard> = repo
            .list_posts()
            .iter()
            .take(HOME_POSTS)
            .map(|p| PostCard::from_post(&serialize(p), config))
            .collect();

        let home = repo.get_page("");
        let page = home.map(|p| self.page_data(p)).transpose()?;
        let meta = PageMetadata::for_page(
            home.map(|p| p.title.as_str()).unwrap_or_default(),
            home.and_then(|p| p.description.as_deref()),
            config,
        );

        self.renderer.render_home(&meta, &latest, page.as_ref())
    }

    pub fn render_listing(&self, repo: &ContentRepository, state: FilterState) -> Result<String> {
        let config = &self.site.config;
        let listing = ListingView::build(repo, config, state)?;
        let meta = PageMetadata::for_page(
            "Blog",
            Some("Articles, write-ups et tutoriels en cybersécurité"),
            config,
        );
        self.renderer.render_listing(&meta, &listing)
    }

    /// Render the post at `slugs`; fails with a not-found content error when
    /// there is none
    pub fn render_post<S: AsRef<str>>(&self, repo: &ContentRepository, slugs: &[S]) -> Result<String> {
        let detail = PostDetail::resolve(repo, &self.site.config, &self.components, slugs)?;
        self.renderer.render_post(&detail)
    }

    pub fn render_page(&self, page: &StaticPage) -> Result<String> {
        let data = self.page_data(page)?;
        let meta = PageMetadata::for_page(&page.title, page.description.as_deref(), &self.site.config);
        self.renderer.render_page(&meta, &data)
    }

    pub fn render_not_found(&self) -> Result<String> {
        let meta = PageMetadata::for_page("Page introuvable", None, &self.site.config);
        self.renderer.render_not_found(&meta)
    }

    fn page_data(&self, page: &StaticPage) -> Result<PageData> {
        Ok(PageData {
            title: page.title.clone(),
            description: page.description.clone(),
            layout: page.layout.clone(),
            url: page.url.clone(),
            html: page.render_body(&self.components)?,
        })
    }

    /// Generate individual post pages
    fn generate_post_pages(&self, repo: &ContentRepository) -> Result<()> {
        for post in repo.list_posts() {
            if post.slugs.is_empty() {
                tracing::warn!("Skipping {}: it would overwrite the blog listing", post.source);
                continue;
            }
            let html = self.render_post(repo, &post.slugs)?;
            self.write_html(&post.url, &html)?;
        }
        tracing::info!("Generated {} posts", repo.list_posts().len());
        Ok(())
    }

    /// Generate standalone pages; the home page is rendered separately
    fn generate_page_pages(&self, repo: &ContentRepository) -> Result<()> {
        for page in repo.pages().iter().filter(|p| !p.is_home()) {
            self.write_html(&page.url, &self.render_page(page)?)?;
        }
        Ok(())
    }

    /// Output file for a site URL: `<public>/<path>/index.html`
    fn output_path(&self, url: &str) -> PathBuf {
        let root = self.site.config.root.trim_end_matches('/');
        let path = url.strip_prefix(root).unwrap_or(url).trim_matches('/');
        if path.is_empty() {
            self.site.public_dir.join("index.html")
        } else {
            self.site.public_dir.join(path).join("index.html")
        }
    }

    fn write_html(&self, url: &str, html: &str) -> Result<()> {
        let output_path = self.output_path(url);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated {:?}", output_path);
        Ok(())
    }

    fn write_stylesheet(&self) -> Result<()> {
        let path = self.site.public_dir.join("css").join("style.css");
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, STYLESHEET)?;
        Ok(())
    }

    /// Atom feed of the most recent posts
    pub fn atom_feed(&self, repo: &ContentRepository) -> Result<String> {
        let config = &self.site.config;
        let site_url = absolute_url(config, &config.root);
        let posts: Vec<&BlogPost> = repo.list_posts().iter().take(config.feed_limit).collect();

        let updated = posts
            .iter()
            .find_map(|p| p.date.as_ref().and_then(|d| d.parsed))
            .map(|d| date_xml(&d))
            .unwrap_or_else(|| date_xml(&chrono::Utc::now()));

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        if !config.description.is_empty() {
            feed.push_str(&format!(
                "  <subtitle>{}</subtitle>\n",
                escape_xml(&config.description)
            ));
        }
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            absolute_url(config, &crate::helpers::url_for(config, "atom.xml"))
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", site_url));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", site_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        let base_url = config.url.trim_end_matches('/');
        for post in posts {
            let link = absolute_url(config, &post.url);
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
            feed.push_str(&format!("    <id>{}</id>\n", link));
            if let Some(date) = post.date.as_ref().and_then(|d| d.parsed) {
                feed.push_str(&format!("    <published>{}</published>\n", date_xml(&date)));
                feed.push_str(&format!("    <updated>{}</updated>\n", date_xml(&date)));
            }
            feed.push_str(&format!(
                "    <author><name>{}</name></author>\n",
                escape_xml(post.author_or(&config.author))
            ));
            for tag in &post.tags {
                feed.push_str(&format!("    <category term=\"{}\"/>\n", escape_xml(tag)));
            }
            if let Some(summary) = &post.description {
                feed.push_str(&format!("    <summary>{}</summary>\n", escape_xml(summary)));
            }
            let content = post.render_body(&self.components)?;
            let content = convert_relative_urls_to_absolute(&content, base_url);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                strip_invalid_xml_chars(&content).replace("]]>", "]]]]><![CDATA[>")
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");
        Ok(feed)
    }

    fn generate_atom_feed(&self, repo: &ContentRepository) -> Result<()> {
        let output_path = self.site.public_dir.join("atom.xml");
        fs::write(&output_path, self.atom_feed(repo)?)?;
        tracing::info!("Generated atom.xml");
        Ok(())
    }

    /// Search index (JSON)
    pub fn search_index(&self, repo: &ContentRepository) -> Result<String> {
        let config = &self.site.config;
        let mut entries = Vec::with_capacity(repo.list_posts().len());
        for post in repo.list_posts() {
            let text = strip_html(&post.render_body(&self.components)?);
            entries.push(serde_json::json!({
                "title": post.title,
                "url": post.url,
                "description": post.description,
                "tags": post.tags,
                "date": post.date.as_ref().and_then(|d| d.iso()),
                "content": excerpt(&text, config.excerpt_length),
            }));
        }
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    fn generate_search_index(&self, repo: &ContentRepository) -> Result<()> {
        let output_path = self.site.public_dir.join("search.json");
        fs::write(&output_path, self.search_index(repo)?)?;
        tracing::info!("Generated search.json");
        Ok(())
    }

    /// Copy `static/` verbatim into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        copy_dir(&self.site.static_dir, &self.site.public_dir)
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Ok(());
    }

    for entry in WalkDir::new(from)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(from)?;
        let dest = to.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest)?;
    }

    Ok(())
}

/// Convert root-relative URLs in HTML content to absolute URLs
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip characters XML 1.0 does not allow
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}
