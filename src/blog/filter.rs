//! Listing filter state

use serde::{Deserialize, Serialize};

use crate::content::SerializableBlogPost;

/// Tag selection and free-text query applied to the blog listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub selected_tag: Option<String>,
    pub search_query: String,
}

impl FilterState {
    /// Initial state from the `tag` query parameter; empty values select nothing
    pub fn from_query(tag: Option<&str>) -> Self {
        Self {
            selected_tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
            search_query: String::new(),
        }
    }

    /// Select `tag`, or clear the selection when it is already selected
    pub fn select_tag(&mut self, tag: &str) {
        if self.selected_tag.as_deref() == Some(tag) {
            self.selected_tag = None;
        } else {
            self.selected_tag = Some(tag.to_string());
        }
    }

    pub fn clear_tag(&mut self) {
        self.selected_tag = None;
    }

    pub fn set_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn is_active(&self) -> bool {
        self.selected_tag.is_some() || !self.search_query.is_empty()
    }

    /// Whether `post` is visible under this state
    pub fn matches(&self, post: &SerializableBlogPost) -> bool {
        let matches_tag = match &self.selected_tag {
            Some(tag) => post.tags.iter().any(|t| t == tag),
            None => true,
        };
        if !matches_tag {
            return false;
        }
        if self.search_query.is_empty() {
            return true;
        }

        let query = self.search_query.to_lowercase();
        post.title.to_lowercase().contains(&query)
            || post
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }
}

/// The visible subset of `posts`, in input order
pub fn filter_posts<'a>(
    state: &FilterState,
    posts: &'a [SerializableBlogPost],
) -> Vec<&'a SerializableBlogPost> {
    posts.iter().filter(|p| state.matches(p)).collect()
}
