//! Parsed page representation shared by all detectors

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Elements whose text never counts as visible page text
const HIDDEN_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Queryable markup plus the URL it came from and its visible text.
///
/// Built once per fetch. `scraper::Html` is not `Send`, so a document must be
/// fully evaluated before the owning task awaits anything else.
pub struct ParsedDocument {
    url: String,
    html: Html,
    text: String,
    text_len: usize,
}

impl ParsedDocument {
    pub fn parse(url: impl Into<String>, markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let text = visible_text(&html);
        let text_len = text.chars().count();
        Self {
            url: url.into(),
            html,
            text,
            text_len,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Visible text with script-like elements removed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of [`Self::text`] in Unicode scalar values
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }
}

impl fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("url", &self.url)
            .field("text_len", &self.text_len)
            .finish_non_exhaustive()
    }
}

fn visible_text(html: &Html) -> String {
    let mut out = String::new();
    for node in html.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => HIDDEN_TEXT_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Text of one element: descendant text nodes, each trimmed, empty ones
/// skipped, joined without a separator
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_and_style_do_not_count_as_text() {
        let doc = ParsedDocument::parse(
            "https://x.test/",
            "<html><head><style>body{color:red}</style><script>var a = 1;</script></head>\
             <body><p>小食堂</p><noscript>enable js</noscript></body></html>",
        );
        assert_eq!(doc.text(), "小食堂");
        assert_eq!(doc.text_len(), 3);
    }

    #[test]
    fn element_text_trims_each_node() {
        let doc = ParsedDocument::parse(
            "https://x.test/",
            "<h1>  小食堂 <span> Siu Sik Tong </span>\n</h1>",
        );
        let h1 = Selector::parse("h1").unwrap();
        let element = doc.select_first(&h1).unwrap();
        assert_eq!(element_text(element), "小食堂Siu Sik Tong");
    }
}
