// src/checker/markdown.rs
// =============================================================================
// This module extracts links from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Reports the byte range of every event, which gives us line and column
//   numbers for the report
// =============================================================================

use super::Link;
use pulldown_cmark::{Event, Parser, Tag};

// Extracts all HTTP/HTTPS links from Markdown text
//
// Parameters:
//   markdown: the markdown text to parse
//   parent: where the text came from (file name), recorded on every link
//
// Example input:
//   "Check out [Rust](https://www.rust-lang.org)!"
//
// Example output:
//   Link { url: "https://www.rust-lang.org", name: "Rust", line: 1, column: 11, .. }
pub fn extract_markdown_links(markdown: &str, parent: &str) -> Vec<Link> {
    let mut links = Vec::new();

    // Markdown parsing produces multiple events per link:
    // 1. Start(Link) - link begins
    // 2. Text - the link text (possibly several pieces)
    // 3. End(Link) - link ends
    let mut current_link: Option<Link> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => {
                let url = dest_url.to_string();
                // Skip mailto:, tel:, relative paths, etc.
                if is_http_link(&url) {
                    let (line, column) = position(markdown, range.start);
                    current_link = Some(Link {
                        url,
                        parent_url: parent.to_string(),
                        line: Some(line),
                        column: Some(column),
                        ..Link::default()
                    });
                }
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some(link) = current_link.as_mut() {
                    link.name.push_str(&text);
                }
            }

            Event::End(Tag::Link(..)) => {
                if let Some(link) = current_link.take() {
                    links.push(link);
                }
            }

            _ => {}
        }
    }

    links
}

// 1-based line and column of a byte offset
fn position(text: &str, offset: usize) -> (u32, u32) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line as u32, column as u32)
}

fn is_http_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does into_offset_iter() add?
//    - Each event comes with the byte range it covers in the input
//    - range.start of a link is where its "[" sits
//
// 2. How do byte offsets become line and column?
//    - Count the newlines before the offset for the line number
//    - Count the characters since the last newline for the column
//    - chars() rather than len(), so non-ASCII text still lines up
//
// 3. What is Option::as_mut()?
//    - Gives a mutable reference to the value inside, if there is one
//    - Used to append text to the link we are currently inside
//
// 4. Why match Event::Text and Event::Code in one arm?
//    - `A(x) | B(x)` matches either variant and binds x in both cases
//    - Link text like [Cargo `book`] arrives as Text then Code
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_link() {
        let markdown = "Check out [Rust](https://www.rust-lang.org)!";
        let links = extract_markdown_links(markdown, "README.md");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://www.rust-lang.org");
        assert_eq!(links[0].name, "Rust");
        assert_eq!(links[0].parent_url, "README.md");
        assert_eq!(links[0].line, Some(1));
        assert_eq!(links[0].column, Some(11));
    }

    #[test]
    fn test_extract_multiple_links_with_lines() {
        let markdown = r#"# Resources

- [Rust](https://www.rust-lang.org)
- [Cargo `book`](https://doc.rust-lang.org/cargo/)
- [Docs](https://doc.rust-lang.org/)
"#;
        let links = extract_markdown_links(markdown, "README.md");
        assert_eq!(links.len(), 3);
        assert_eq!(links[1].name, "Cargo book");
        assert_eq!(links[1].line, Some(4));
        assert_eq!(links[2].line, Some(5));
    }

    #[test]
    fn test_skip_mailto_links() {
        let markdown = "Email me at [email](mailto:test@example.com)";
        assert!(extract_markdown_links(markdown, "README.md").is_empty());
    }

    #[test]
    fn test_skip_relative_links() {
        let markdown = "See [docs](./docs/README.md)";
        assert!(extract_markdown_links(markdown, "README.md").is_empty());
    }
}
