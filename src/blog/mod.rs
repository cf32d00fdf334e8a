//! Blog section: tag index, listing filters, post detail and page metadata

mod detail;
mod filter;
mod listing;
mod metadata;
mod tags;

pub use detail::{PostDetail, PostLink, TagLink};
pub use filter::{filter_posts, FilterState};
pub use listing::{ListingView, PostCard};
pub use metadata::{OpenGraph, PageMetadata, TwitterCard};
pub use tags::{build_tag_index, build_tag_index_serialized};
