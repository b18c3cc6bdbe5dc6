use super::Error;
use scraper::{ElementRef, Node, Selector};

// elements that start a new line of text
const BLOCKS: [&str; 14] = [
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section", "blockquote", "pre",
];

/// Text of the first element matching `selector`, one line per block.
pub fn text_from_selection(
    selector: &Selector,
    element: ElementRef<'_>,
    parent_label: &str,
    child_label: &str,
) -> Result<String, Error> {
    let parent = element
        .select(selector)
        .next() // first match
        .ok_or_else(|| {
            Error::HtmlParse(format!(
                "Every {parent_label} element should have a {child_label}."
            ))
        })?;
    Ok(get_block_text(parent))
}

/// Concatenates the text nodes under `element`, breaking the line at every
/// block element so inline markup (`<strong>`, `<span>`) stays on its line.
pub fn get_block_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if BLOCKS.contains(&e.name()) => text.push('\n'),
            _ => {}
        }
    }
    text
}
