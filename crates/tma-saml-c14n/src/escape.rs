#![forbid(unsafe_code)]

//! Character escaping for C14N output.
//!
//! - Text nodes: `&`, `<`, `>` and `\r`
//! - Attribute values: `&`, `<`, `"`, `\t`, `\n` and `\r`
//! - PI data: `\r`

/// Escape text node content.
pub fn escape_text(s: &str) -> String {
    escape_with(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

/// Escape an attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_with(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#x9;"),
        '\n' => Some("&#xA;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

/// Escape processing instruction data.
pub fn escape_pi(s: &str) -> String {
    s.replace('\r', "&#xD;")
}

fn escape_with(s: &str, replacement: impl Fn(char) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match replacement(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escaping() {
        assert_eq!(escape_text("987654329"), "987654329");
        assert_eq!(escape_text("a&b<c>d"), "a&amp;b&lt;c&gt;d");
        assert_eq!(escape_text("line\rend"), "line&#xD;end");
        assert_eq!(escape_text("quote\"kept"), "quote\"kept");
    }

    #[test]
    fn attribute_escaping() {
        assert_eq!(escape_attr("a&b\"c>"), "a&amp;b&quot;c>");
        assert_eq!(escape_attr("a\tb\nc\rd"), "a&#x9;b&#xA;c&#xD;d");
    }
}
