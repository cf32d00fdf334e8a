//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::ContentError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Dates may be authored quoted, unquoted or as bare numbers
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct Scalar;

    impl<'de> Visitor<'de> for Scalar {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a date string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Scalar)
}

/// Front-matter data from a blog post or page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub draft: bool,
    /// Page layout (`page` or `contact`)
    pub layout: Option<String>,
    /// Position of a page in navigation
    pub order: Option<i64>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with(";;;") {
            return Self::parse_json(content);
        }

        // No front-matter found
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), ContentError> {
        let rest = &content[3..];
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        // Closing fence directly after the opening one
        if let Some(remaining) = rest.strip_prefix("---") {
            return Ok((FrontMatter::default(), remaining.trim_start_matches(['\n', '\r'])));
        }

        let rest = rest.trim_start_matches(['\n', '\r']);
        let Some(end_pos) = rest.find("\n---") else {
            // No closing ---, treat as no front-matter
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..];
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading `---` can also be a markdown thematic break
        if !has_yaml_structure(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        serde_yaml::from_str::<FrontMatter>(yaml_content)
            .map(|fm| (fm, remaining))
            .map_err(|e| ContentError::Frontmatter {
                message: e.to_string(),
            })
    }

    fn parse_json(content: &str) -> Result<(Self, &str), ContentError> {
        let rest = &content[3..];
        let Some(end_pos) = rest.find(";;;") else {
            return Err(ContentError::Frontmatter {
                message: "unterminated JSON front-matter".to_string(),
            });
        };

        let json_content = &rest[..end_pos];
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        let fm: FrontMatter =
            serde_json::from_str(json_content).map_err(|e| ContentError::Frontmatter {
                message: e.to_string(),
            })?;

        Ok((fm, remaining))
    }
}

/// Valid front-matter has at least one `key: value` line
fn has_yaml_structure(yaml_content: &str) -> bool {
    yaml_content.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blog_frontmatter() {
        let content = r#"---
title: "iconv: Set the Charset to RCE"
description: Exploiting CVE-2024-2961
date: 2024-05-27
tags:
  - web
  - vulnerability
image: /images/iconv.png
---

Body here.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("iconv: Set the Charset to RCE"));
        assert_eq!(fm.description.as_deref(), Some("Exploiting CVE-2024-2961"));
        assert_eq!(fm.date.as_deref(), Some("2024-05-27"));
        assert_eq!(fm.tags, vec!["web", "vulnerability"]);
        assert_eq!(fm.image.as_deref(), Some("/images/iconv.png"));
        assert!(fm.author.is_none());
        assert!(fm.excerpt.is_none());
        assert!(remaining.starts_with("Body here."));
    }

    #[test]
    fn test_optional_fields_default() {
        let content = "---\ntitle: Minimal\n---\ntext";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Minimal"));
        assert!(fm.tags.is_empty());
        assert!(fm.date.is_none());
        assert!(!fm.draft);
        assert_eq!(remaining, "text");
    }

    #[test]
    fn test_single_string_tag_and_numeric_date() {
        let content = "---\ntitle: One\ntags: ctf\ndate: 2024\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["ctf"]);
        assert_eq!(fm.date.as_deref(), Some("2024"));
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#";;;
{"title": "Json Post", "tags": ["a", "b"]}
;;;
Content.
"#;
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Json Post"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(remaining.starts_with("Content."));
    }

    #[test]
    fn test_thematic_break_not_yaml() {
        let content = "---\n\nSome prose with https://example.com\n\n---\nMore.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert!(remaining.contains("Some prose"));
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, "Body");

        let (_, remaining) = FrontMatter::parse("---\r\n---\r\n\r\n# Title").unwrap();
        assert_eq!(remaining, "# Title");
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let content = "---\ntitle: [unclosed\ntags: x\n---\nBody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, ContentError::Frontmatter { .. }));
    }
}
