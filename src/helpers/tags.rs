//! Tag colour classes

/// Class used for tags without a dedicated colour
pub const DEFAULT_TAG_COLOR: &str = "bg-gray-500/10 text-gray-500 border-gray-500/20";

const TAG_COLORS: &[(&str, &str)] = &[
    ("pentest", "bg-red-500/10 text-red-500 border-red-500/20"),
    ("ctf", "bg-blue-500/10 text-blue-500 border-blue-500/20"),
    (
        "vulnerability",
        "bg-orange-500/10 text-orange-500 border-orange-500/20",
    ),
    ("web", "bg-green-500/10 text-green-500 border-green-500/20"),
    ("network", "bg-cyan-500/10 text-cyan-500 border-cyan-500/20"),
    ("crypto", "bg-purple-500/10 text-purple-500 border-purple-500/20"),
    ("reverse", "bg-pink-500/10 text-pink-500 border-pink-500/20"),
    (
        "writeup",
        "bg-indigo-500/10 text-indigo-500 border-indigo-500/20",
    ),
    (
        "tutorial",
        "bg-yellow-500/10 text-yellow-500 border-yellow-500/20",
    ),
];

/// Colour class for a tag, matched case-insensitively
pub fn get_tag_color(tag: &str) -> &'static str {
    let key = tag.to_lowercase();
    TAG_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, class)| *class)
        .unwrap_or(DEFAULT_TAG_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(get_tag_color("Web"), get_tag_color("web"));
        assert_eq!(get_tag_color("CTF"), "bg-blue-500/10 text-blue-500 border-blue-500/20");
    }

    #[test]
    fn test_unknown_tag_uses_default() {
        assert_eq!(get_tag_color("unknown-tag"), DEFAULT_TAG_COLOR);
        assert_eq!(get_tag_color(""), DEFAULT_TAG_COLOR);
    }
}
