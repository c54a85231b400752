//! Visible-text extraction from HTML documents.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{MaintenanceError, Result};

const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| MaintenanceError::Crawl(format!("Invalid selector '{css}': {e}")))
}

/// Text a visitor would see, whitespace collapsed to single spaces
pub fn extract_visible_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let body = selector("body")?;
    let root = document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element());

    Ok(collect_text(root))
}

fn collect_text(root: ElementRef<'_>) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// First `max_chars` characters of `text`, on a char boundary
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_body_text_without_scripts_and_styles() {
        let html = r#"
            <html>
              <head><title>Ignored</title><style>body { color: red }</style></head>
              <body>
                <h1>AI   Consulting</h1>
                <script>var tracking = true;</script>
                <p>We build <b>intelligent</b> systems.</p>
                <noscript>Enable JavaScript</noscript>
              </body>
            </html>"#;

        let text = extract_visible_text(html).unwrap();
        assert_eq!(text, "AI Consulting We build intelligent systems.");
    }

    #[test]
    fn test_fragment_without_body() {
        let text = extract_visible_text("<p>Just a fragment</p>").unwrap();
        assert_eq!(text, "Just a fragment");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 100), "short");
    }
}
