use bravepipe_core::ExtractedDocument;

/// Subtrees rooted at these elements never contribute text.
pub const STRIPPED_TAGS: [&str; 6] = ["script", "style", "nav", "footer", "header", "aside"];

pub fn truncation_marker(max_length: usize) -> String {
    format!("...\n[Content truncated due to length exceeding {max_length} characters]")
}

/// HTML -> cleaned, bounded text.
///
/// Notes:
/// - Every text node is its own block; blocks are separated by newlines.
/// - Lines are stripped and empty lines dropped, so the output never has blank
///   runs or per-line leading/trailing whitespace.
/// - Truncation is a hard character cut (not a word boundary) followed by
///   `truncation_marker(max_length)`.
pub fn extract(html: &str, max_length: usize) -> ExtractedDocument {
    truncate(clean_lines(&visible_text(html)), max_length)
}

fn visible_text(html: &str) -> String {
    let mut out = String::new();
    walk(&html_scraper::Html::parse_document(html), &mut out);
    out
}

fn walk(doc: &html_scraper::Html, out: &mut String) {
    // Iterative walk; deeply nested markup must not exhaust the stack.
    let mut stack = vec![doc.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            html_scraper::Node::Text(t) => {
                out.push_str(t);
                out.push('\n');
            }
            html_scraper::Node::Element(e) if STRIPPED_TAGS.contains(&e.name()) => continue,
            // Parsed as raw text with scripting on; re-parse so markup never leaks.
            html_scraper::Node::Element(e) if e.name() == "noscript" => {
                let mut raw = String::new();
                for child in node.children() {
                    if let Some(t) = child.value().as_text() {
                        raw.push_str(t);
                    }
                }
                walk(&html_scraper::Html::parse_fragment(&raw), out);
            }
            html_scraper::Node::Document
            | html_scraper::Node::Fragment
            | html_scraper::Node::Element(_) => {
                stack.extend(node.children().rev());
            }
            _ => {}
        }
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split into lines, strip each, drop empties, rejoin with a single newline.
pub fn clean_lines(text: &str) -> String {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` to exactly `max_length` characters plus the marker when it is longer.
pub fn truncate(text: String, max_length: usize) -> ExtractedDocument {
    let source_chars = text.chars().count();
    if source_chars <= max_length {
        return ExtractedDocument {
            text,
            truncated: false,
            source_chars,
        };
    }
    let mut out: String = text.chars().take(max_length).collect();
    out.push_str(&truncation_marker(max_length));
    ExtractedDocument {
        text: out,
        truncated: true,
        source_chars,
    }
}
