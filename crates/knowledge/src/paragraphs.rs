//! Paragraph extraction from raw documents.
//!
//! HTML pages yield the text of their `<p>` elements; anything else is
//! split on blank lines. Whitespace inside a paragraph is collapsed.

use scraper::{Html, Selector};
use tracing::warn;

pub fn paragraphs(document: &str) -> Vec<String> {
    let blocks = if looks_like_html(document) {
        html_paragraphs(document)
    } else {
        text_paragraphs(document)
    };

    blocks
        .into_iter()
        .map(|b| collapse_whitespace(&b))
        .filter(|b| !b.is_empty())
        .collect()
}

/// Paragraphs longer than `min_chars` that mention any of `keywords`.
///
/// Keywords are expected in lowercase.
pub fn matching_paragraphs(document: &str, keywords: &[&str], min_chars: usize) -> Vec<String> {
    paragraphs(document)
        .into_iter()
        .filter(|p| p.chars().count() > min_chars)
        .filter(|p| {
            let lowered = p.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k))
        })
        .collect()
}

fn looks_like_html(document: &str) -> bool {
    document.trim_start().starts_with('<') || document.contains("<p")
}

fn html_paragraphs(document: &str) -> Vec<String> {
    let html = Html::parse_document(document);
    let selector = match Selector::parse("p") {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Paragraph selector rejected");
            return Vec::new();
        }
    };

    html.select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

fn text_paragraphs(document: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line.trim());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_yields_p_elements_only() {
        let doc = r#"<html><head><title>T</title><script>var x;</script></head>
            <body><h1>Heading</h1>
            <p>First   paragraph
               about <b>trust</b>.</p>
            <div>Not a paragraph</div>
            <p>Second one.</p></body></html>"#;
        let ps = paragraphs(doc);
        assert_eq!(ps, vec!["First paragraph about trust.", "Second one."]);
    }

    #[test]
    fn plain_text_splits_on_blank_lines() {
        let doc = "line one\nline two\n\n  \nthird\n";
        assert_eq!(paragraphs(doc), vec!["line one line two", "third"]);
    }

    #[test]
    fn matching_filters_by_keyword_and_length() {
        let long_hit = "Rest and sleep help the body recover from prolonged fatigue and emotional strain.";
        let long_miss = "This paragraph talks about the weather and nothing else of interest at all, really.";
        let doc = format!("{long_hit}\n\nfatigue\n\n{long_miss}");
        let hits = matching_paragraphs(&doc, &["fatigue", "sleep"], 40);
        assert_eq!(hits, vec![long_hit.to_string()]);
    }

    #[test]
    fn keyword_match_ignores_case() {
        let doc = "<p>Betrayal by a close friend can shake the foundations of trust for a long time.</p>";
        assert_eq!(matching_paragraphs(doc, &["betrayal"], 10).len(), 1);
    }
}
