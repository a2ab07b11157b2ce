//! Page frame: document head with inlined assets, and the closing tags.

use crate::config::ReportConfig;
use errlog_common::markup::{element, void_element};

const RESET_CSS: &str = include_str!("../assets/css/reset.css");
const ERROR_CSS: &str = include_str!("../assets/css/error.css");
const THEME_CSS: &str = include_str!("../assets/css/theme.css");
const HIGHLIGHT_JS: &str = include_str!("../assets/js/highlight.js");

/// Everything up to and including `<body>`.
pub fn leader(config: &ReportConfig) -> String {
    let mut html = String::with_capacity(
        RESET_CSS.len() + ERROR_CSS.len() + THEME_CSS.len() + HIGHLIGHT_JS.len() + 512,
    );
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(r#"<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en" lang="en">"#);
    html.push_str("<head>");
    html.push_str(&void_element("meta", &[("charset", Some("UTF-8"))]));
    html.push_str(&element("title", &[], &config.title));

    html.push_str("<style>");
    html.push_str(RESET_CSS);
    html.push_str(ERROR_CSS);
    html.push_str(THEME_CSS);
    html.push_str("</style>");

    html.push_str("<script>");
    html.push_str(HIGHLIGHT_JS);
    html.push_str("</script>");
    html.push_str("<script>hljs.initHighlightingOnLoad();</script>");

    html.push_str("</head><body>");
    html
}

/// Closing tags of the document.
pub fn trailer() -> &'static str {
    "</body></html>\n"
}

/// Heading of the variable dump section.
pub fn dump_heading() -> &'static str {
    "<h2>VarDump</h2>"
}
