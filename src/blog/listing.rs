//! Blog listing view

use anyhow::Result;
use serde::Serialize;

use super::{build_tag_index_serialized, filter_posts, FilterState, TagLink};
use crate::config::SiteConfig;
use crate::content::{serialize_all, ContentRepository, SerializableBlogPost};
use crate::helpers::{excerpt, format_date_str, iso_string, parse_date_string};

/// One post card in the listing grid
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub date: Option<String>,
    pub datetime: Option<String>,
    /// At most three tags are shown on a card
    pub tags: Vec<TagLink>,
    /// Rendered but hidden when the current filter excludes the post
    pub hidden: bool,
}

impl PostCard {
    pub fn from_post(post: &SerializableBlogPost, config: &SiteConfig) -> Self {
        let tz = config.tz();
        let summary = post
            .description
            .clone()
            .or_else(|| post.excerpt.as_deref().map(|e| excerpt(e, config.excerpt_length)));

        Self {
            url: post.url.clone(),
            title: post.title.clone(),
            summary,
            image: post.image.clone(),
            date: post.date.as_deref().and_then(|d| format_date_str(d, tz)),
            datetime: post
                .date
                .as_deref()
                .and_then(|d| parse_date_string(d, tz))
                .map(|d| iso_string(&d)),
            tags: post
                .tags
                .iter()
                .take(3)
                .map(|t| TagLink::new(t, config, false))
                .collect(),
            hidden: false,
        }
    }
}

/// Everything the listing template needs
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub state: FilterState,
    /// Tag filter buttons, with the selected one marked active
    pub tags: Vec<TagLink>,
    /// Cards for every post, with the filtered-out ones hidden
    pub cards: Vec<PostCard>,
    pub visible: usize,
    pub total: usize,
    /// Serialized posts for the client-side filter script
    pub posts_json: String,
    pub tags_json: String,
}

impl ListingView {
    /// Build the listing for `state` over every post in the repository
    pub fn build(repo: &ContentRepository, config: &SiteConfig, state: FilterState) -> Result<Self> {
        let posts = serialize_all(repo.list_posts());
        Self::from_serialized(&posts, config, state)
    }

    pub fn from_serialized(
        posts: &[SerializableBlogPost],
        config: &SiteConfig,
        state: FilterState,
    ) -> Result<Self> {
        let tag_index = build_tag_index_serialized(posts);
        let visible = filter_posts(&state, posts).len();

        let tags = tag_index
            .iter()
            .map(|t| TagLink::new(t, config, state.selected_tag.as_deref() == Some(t.as_str())))
            .collect();
        let cards = posts
            .iter()
            .map(|p| PostCard {
                hidden: !state.matches(p),
                ..PostCard::from_post(p, config)
            })
            .collect();

        Ok(Self {
            visible,
            total: posts.len(),
            tags,
            cards,
            posts_json: script_json(&posts)?,
            tags_json: script_json(&tag_index)?,
            state,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.visible == 0
    }
}

/// JSON safe to inline inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::post;

    fn repo() -> ContentRepository {
        let mut alpha = post("alpha", "Alpha breach", &["web", "pentest", "writeup", "ctf"], Some("2024-02-10"));
        alpha.description = Some("SQLi to RCE".to_string());
        let mut beta = post("beta", "Beta ctf", &["ctf"], Some("2024-01-05"));
        beta.excerpt = Some("**Pwn** challenge".to_string());
        ContentRepository::from_posts(vec![beta, alpha])
    }

    #[test]
    fn test_unfiltered_listing() {
        let config = SiteConfig::default();
        let view = ListingView::build(&repo(), &config, FilterState::default()).unwrap();
        assert_eq!(view.total, 2);
        assert_eq!(view.visible, 2);
        assert_eq!(view.cards[0].title, "Alpha breach");
        assert_eq!(view.cards[0].date.as_deref(), Some("10 février 2024"));
        assert_eq!(view.cards[0].datetime.as_deref(), Some("2024-02-10T00:00:00.000Z"));
        assert_eq!(view.cards[0].tags.len(), 3);
        assert_eq!(view.cards[0].summary.as_deref(), Some("SQLi to RCE"));
        assert_eq!(view.cards[1].summary.as_deref(), Some("Pwn challenge"));

        let names: Vec<_> = view.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ctf", "pentest", "web", "writeup"]);
        assert!(view.tags.iter().all(|t| !t.active));
    }

    #[test]
    fn test_filtered_listing_marks_active_tag() {
        let config = SiteConfig::default();
        let view = ListingView::build(&repo(), &config, FilterState::from_query(Some("web"))).unwrap();
        assert_eq!(view.visible, 1);
        assert_eq!(view.total, 2);
        let hidden: Vec<_> = view.cards.iter().map(|c| (c.title.as_str(), c.hidden)).collect();
        assert_eq!(hidden, vec![("Alpha breach", false), ("Beta ctf", true)]);
        let active: Vec<_> = view.tags.iter().filter(|t| t.active).map(|t| t.name.as_str()).collect();
        assert_eq!(active, vec!["web"]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let config = SiteConfig::default();
        let mut state = FilterState::default();
        state.set_query("kernel");
        let view = ListingView::build(&repo(), &config, state).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.total, 2);
        assert_eq!(view.cards.len(), 2);
        assert!(view.cards.iter().all(|c| c.hidden));
    }

    #[test]
    fn test_embedded_json_round_trips() {
        let config = SiteConfig::default();
        let view = ListingView::build(&repo(), &config, FilterState::default()).unwrap();
        let posts: Vec<SerializableBlogPost> = serde_json::from_str(&view.posts_json).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].url, "/blog/alpha");
    }

    #[test]
    fn test_script_json_escapes_closing_tags() {
        let json = script_json(&vec!["</script>"]).unwrap();
        assert_eq!(json, r#"["<\/script>"]"#);
    }
}
