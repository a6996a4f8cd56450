use scraper::{ElementRef, Html, Node};

/// Tags that end a line of text when they open or close.
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "pre", "hr", "dl", "dt", "dd", "section",
];

/// Tags whose content is never shown.
const HIDDEN_TAGS: &[&str] = &["script", "style", "head", "title", "noscript", "svg", "iframe"];

/// Render untrusted description HTML as plain text. Only text nodes are
/// kept; block elements become line breaks.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    collect_text(fragment.root_element(), &mut out);
    collapse_lines(&out.replace('\u{a0}', " "))
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    end_line(out);
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, out);
                }
                if block {
                    end_line(out);
                }
            }
            _ => {}
        }
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Trim every line and drop runs of blank lines.
fn collapse_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_tags() {
        assert_eq!(
            html_to_text("<b>Bold</b> and <i>italic</i> <a href=\"javascript:x\">link</a>"),
            "Bold and italic link"
        );
    }

    #[test]
    fn block_tags_become_lines() {
        assert_eq!(
            html_to_text("<div>First</div><div>Second<br/>Third</div><ul><li>a</li><li>b</li></ul>"),
            "First\nSecond\nThird\na\nb"
        );
    }

    #[test]
    fn script_and_style_content_is_dropped() {
        assert_eq!(
            html_to_text("<p>Hi</p><script>alert('x')</script><style>p{}</style>there"),
            "Hi\nthere"
        );
    }

    #[test]
    fn attribute_values_never_leak() {
        assert_eq!(html_to_text("<p title=\"a>b\">Hello</p>"), "Hello");
        assert_eq!(
            html_to_text("<img alt=\"x > y\" src=\"a.png\">caption"),
            "caption"
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(html_to_text("<p>Hi<!-- if a > b then secret --></p>"), "Hi");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            html_to_text("a &amp; b &lt;c&gt; &quot;d&quot; &#39;e&#39; &#x41;&nbsp;f"),
            "a & b <c> \"d\" 'e' A f"
        );
    }

    #[test]
    fn markup_in_text_is_not_interpreted() {
        assert_eq!(
            html_to_text("&lt;script&gt;alert(1)&lt;/script&gt;"),
            "<script>alert(1)</script>"
        );
    }

    #[test]
    fn unterminated_tag_is_text() {
        assert_eq!(html_to_text("x < y"), "x < y");
    }

    #[test]
    fn empty_input() {
        assert_eq!(html_to_text(""), "");
    }
}
