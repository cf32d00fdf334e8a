//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// A heading collected for the table of contents
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TocEntry {
    pub level: usize,
    pub id: String,
    pub text: String,
}

/// Collect `<h2>`..`<h{max_depth}>` headings from rendered HTML.
///
/// Headings carrying an `id` attribute keep it; others get a slugified id,
/// which matches the ids `add_heading_ids` assigns.
pub fn toc(content: &str, max_depth: usize) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut rest = content;

    while let Some(pos) = rest.find("<h") {
        rest = &rest[pos + 2..];
        let level = match rest.chars().next().and_then(|c| c.to_digit(10)) {
            Some(l) => l as usize,
            None => continue,
        };
        if !(2..=max_depth).contains(&level) {
            continue;
        }
        let Some(open_end) = rest.find('>') else {
            break;
        };
        let attrs = &rest[1..open_end];
        let close = format!("</h{}>", level);
        let Some(close_pos) = rest[open_end..].find(&close) else {
            break;
        };
        let inner = &rest[open_end + 1..open_end + close_pos];
        let text = strip_html(inner).trim().to_string();
        let id = attr_value(attrs, "id").unwrap_or_else(|| slug::slugify(&text));

        entries.push(TocEntry { level, id, text });
        rest = &rest[open_end + close_pos + close.len()..];
    }

    entries
}

/// Give every `<h1>`..`<h6>` without an id a slugified one
pub fn add_heading_ids(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find("<h") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let level = tail[2..].chars().next().and_then(|c| c.to_digit(10));
        let (Some(level), Some(open_end)) = (level, tail.find('>')) else {
            out.push_str("<h");
            rest = &tail[2..];
            continue;
        };
        let attrs = &tail[3..open_end];
        let close = format!("</h{}>", level);
        match tail[open_end..].find(&close) {
            Some(close_pos) if attr_value(attrs, "id").is_none() => {
                let inner = &tail[open_end + 1..open_end + close_pos];
                let id = slug::slugify(strip_html(inner).trim());
                out.push_str(&format!("<h{}{} id=\"{}\">", level, attrs, id));
                out.push_str(inner);
                out.push_str(&close);
                rest = &tail[open_end + close_pos + close.len()..];
            }
            _ => {
                out.push_str(&tail[..open_end + 1]);
                rest = &tail[open_end + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn attr_value(attrs: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = attrs.find(&needle)? + needle.len();
    let end = attrs[start..].find('"')?;
    Some(attrs[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_toc_collects_h2_h3() {
        let html = "<h1>Top</h1><h2>Recon phase</h2><p>x</p><h3 id=\"custom\">Nmap</h3><h4>Deep</h4>";
        let entries = toc(html, 3);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "recon-phase");
        assert_eq!(entries[0].level, 2);
        assert_eq!(entries[1].id, "custom");
        assert_eq!(entries[1].text, "Nmap");
    }

    #[test]
    fn test_add_heading_ids() {
        let html = "<h2>Getting a shell</h2><h3 id=\"keep\">Kept</h3><hr />";
        let out = add_heading_ids(html);
        assert_eq!(
            out,
            "<h2 id=\"getting-a-shell\">Getting a shell</h2><h3 id=\"keep\">Kept</h3><hr />"
        );
    }
}
