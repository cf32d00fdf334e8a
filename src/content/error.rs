//! Content errors

use thiserror::Error;

/// Errors surfaced by the content layer
#[derive(Debug, Error)]
pub enum ContentError {
    /// No document matches the requested slug path
    #[error("no post found at `{slug}`")]
    NotFound { slug: String },

    /// Front-matter block could not be parsed
    #[error("invalid front-matter: {message}")]
    Frontmatter { message: String },
}

impl ContentError {
    pub fn not_found<S: AsRef<str>>(slugs: &[S]) -> Self {
        let slug = slugs
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("/");
        ContentError::NotFound { slug }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}
