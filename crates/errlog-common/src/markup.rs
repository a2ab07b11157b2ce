//! Minimal HTML markup helpers.
//!
//! Attribute values are always escaped. Attributes given as `None` are left
//! out entirely, which lets callers pass optional `title`/`class` values
//! without branching.

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape text and turn line feeds into `<br/>`.
pub fn text_to_html(s: &str) -> String {
    html_escape(s).replace('\n', "<br/>")
}

/// Opening tag with attributes, e.g. `<ol start="3">`.
pub fn tag(name: &str, attributes: &[(&str, Option<&str>)]) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('<');
    out.push_str(name);
    push_attributes(&mut out, attributes);
    out.push('>');
    out
}

/// Void element, e.g. `<meta charset="UTF-8"/>`.
pub fn void_element(name: &str, attributes: &[(&str, Option<&str>)]) -> String {
    let mut out = String::with_capacity(name.len() + 3);
    out.push('<');
    out.push_str(name);
    push_attributes(&mut out, attributes);
    out.push_str("/>");
    out
}

/// Element with text content; the content is escaped.
pub fn element(name: &str, attributes: &[(&str, Option<&str>)], text: &str) -> String {
    raw_element(name, attributes, &html_escape(text))
}

/// Element whose content is already markup and is inserted as is.
pub fn raw_element(name: &str, attributes: &[(&str, Option<&str>)], html: &str) -> String {
    let mut out = tag(name, attributes);
    out.push_str(html);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    out
}

/// `<span class="...">text</span>`, the most common fragment in a report.
pub fn span(class: &str, text: &str) -> String {
    element("span", &[("class", Some(class))], text)
}

fn push_attributes(out: &mut String, attributes: &[(&str, Option<&str>)]) {
    for (key, value) in attributes {
        if let Some(value) = value {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&html_escape(value));
            out.push('"');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape(r#""quoted""#), "&quot;quoted&quot;");
    }

    #[test]
    fn test_text_to_html_converts_line_breaks() {
        assert_eq!(text_to_html("a<b\nc"), "a&lt;b<br/>c");
    }

    #[test]
    fn test_element_skips_missing_attributes() {
        let html = element("li", &[("class", None)], "");
        assert_eq!(html, "<li></li>");

        let html = element("span", &[("class", Some("string")), ("title", None)], "x");
        assert_eq!(html, r#"<span class="string">x</span>"#);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let html = tag("th", &[("title", Some("a\"b"))]);
        assert_eq!(html, r#"<th title="a&quot;b">"#);
    }

    #[test]
    fn test_raw_element_keeps_markup() {
        let html = raw_element("td", &[], "<span>x</span>");
        assert_eq!(html, "<td><span>x</span></td>");
    }

    #[test]
    fn test_void_element() {
        assert_eq!(
            void_element("meta", &[("charset", Some("UTF-8"))]),
            r#"<meta charset="UTF-8"/>"#
        );
    }
}
