//! HTML utility functions.
//!
//! Pages are treated as opaque text; only tag positions are located.

use std::borrow::Cow;

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Byte offset of the last occurrence of `tag`, compared ASCII case-insensitively.
///
/// Searching from the end keeps `</body>` inside scripts or comments
/// earlier in the document from winning.
pub fn rfind_tag(html: &str, tag: &str) -> Option<usize> {
    let haystack = html.as_bytes();
    let needle = tag.as_bytes();
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Insert `snippet` before the last `tag`, or append when the tag is missing.
pub fn insert_before(html: &mut String, tag: &str, snippet: &str) {
    match rfind_tag(html, tag) {
        Some(pos) => html.insert_str(pos, snippet),
        None => html.push_str(snippet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_rfind_tag_case_insensitive() {
        let html = "<html><BODY>x</BODY></html>";
        assert_eq!(rfind_tag(html, "</body>"), Some(13));
        assert_eq!(rfind_tag(html, "</head>"), None);
    }

    #[test]
    fn test_rfind_tag_last_occurrence() {
        let html = "<script>'</body>'</script></body>";
        assert_eq!(rfind_tag(html, "</body>"), Some(26));
    }

    #[test]
    fn test_insert_before() {
        let mut html = String::from("<head></head>");
        insert_before(&mut html, "</head>", "<x>");
        assert_eq!(html, "<head><x></head>");

        let mut fragment = String::from("<p>hi</p>");
        insert_before(&mut fragment, "</body>", "<s>");
        assert_eq!(fragment, "<p>hi</p><s>");
    }
}
