//! Content module - blog posts, static pages and body rendering

pub mod body;
pub mod components;
mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use body::{Body, ContentBody, MdxBody};
pub use components::{Component, ComponentMap, Props};
pub use error::ContentError;
pub use frontmatter::FrontMatter;
pub use loader::ContentRepository;
pub use markdown::MarkdownRenderer;
pub use post::{serialize, serialize_all, BlogPost, PostDate, SerializableBlogPost, StaticPage};

#[cfg(test)]
pub(crate) use post::testing;
