//! Tag index

use std::collections::BTreeSet;

use crate::content::{BlogPost, SerializableBlogPost};

/// Sorted, de-duplicated set of every tag used by `posts`.
///
/// Ordering is byte-wise and case-sensitive; the result does not depend on
/// the order of the input.
pub fn build_tag_index<'a, I>(posts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a BlogPost>,
{
    collect(posts.into_iter().flat_map(|p| p.tags.iter()))
}

/// Same as `build_tag_index`, over serialized posts
pub fn build_tag_index_serialized<'a, I>(posts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a SerializableBlogPost>,
{
    collect(posts.into_iter().flat_map(|p| p.tags.iter()))
}

fn collect<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<String> {
    tags.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::post;
    use crate::content::serialize;

    #[test]
    fn test_union_sorted_and_deduplicated() {
        let posts = vec![
            post("a", "A", &["web", "ctf"], None),
            post("b", "B", &["ctf", "Crypto", "web"], None),
            post("c", "C", &[], None),
        ];
        assert_eq!(build_tag_index(&posts), vec!["Crypto", "ctf", "web"]);
    }

    #[test]
    fn test_idempotent_and_order_independent() {
        let posts = vec![
            post("a", "A", &["pentest", "web"], None),
            post("b", "B", &["reverse"], None),
            post("c", "C", &["web", "ctf"], None),
        ];
        let first = build_tag_index(&posts);
        assert_eq!(first, build_tag_index(&posts));

        let mut reversed = posts.clone();
        reversed.reverse();
        assert_eq!(first, build_tag_index(&reversed));

        let rotated: Vec<_> = posts.iter().cycle().skip(1).take(3).collect();
        assert_eq!(first, build_tag_index(rotated));
    }

    #[test]
    fn test_serialized_variant_matches() {
        let posts = vec![
            post("a", "A", &["web"], None),
            post("b", "B", &["ctf", "web"], None),
        ];
        let serialized: Vec<_> = posts.iter().map(serialize).collect();
        assert_eq!(build_tag_index(&posts), build_tag_index_serialized(&serialized));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tag_index(&Vec::<BlogPost>::new()).is_empty());
    }
}
