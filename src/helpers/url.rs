//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/site/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }

    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about") // -> "https://example.com/about"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Prefix an already rooted path (such as a post url) with the site domain
pub fn absolute_url(config: &SiteConfig, rooted_path: &str) -> String {
    if is_external(rooted_path) {
        return rooted_path.to_string();
    }
    format!(
        "{}/{}",
        config.url.trim_end_matches('/'),
        rooted_path.trim_start_matches('/')
    )
}

/// Link to the blog listing filtered on one tag
pub fn tag_url(config: &SiteConfig, tag: &str) -> String {
    format!("{}?tag={}", config.blog_base(), encode_url(tag))
}

/// Percent-encode a URL component
pub fn encode_url(path: &str) -> String {
    percent_encoding::utf8_percent_encode(path, percent_encoding::NON_ALPHANUMERIC).to_string()
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/site/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/site/css/style.css");
        assert_eq!(url_for(&config, "about"), "/site/about");
        assert_eq!(url_for(&config, ""), "/site/");
        assert_eq!(url_for(&config, "https://cdn.example/x.png"), "https://cdn.example/x.png");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/blog/hello"),
            "https://example.com/site/blog/hello"
        );
    }

    #[test]
    fn test_absolute_url_keeps_root_once() {
        let config = test_config();
        assert_eq!(
            absolute_url(&config, "/site/blog/hello"),
            "https://example.com/site/blog/hello"
        );
    }

    #[test]
    fn test_tag_url_is_encoded() {
        let config = SiteConfig::default();
        assert_eq!(tag_url(&config, "web"), "/blog?tag=web");
        assert_eq!(tag_url(&config, "red team"), "/blog?tag=red%20team");
    }
}
