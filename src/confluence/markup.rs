//! Markdown to Confluence storage-format converter
//!
//! Converts the loose Markdown produced by the LLM into the storage markup
//! accepted by the Confluence content API. The rules are applied in a fixed
//! order and each one sees the output of the previous rule:
//!
//! 1. Headers (ordered global replacements, see [`HEADER_RULES`])
//! 2. Bold markers (`**` toggles `<strong>` / `</strong>`)
//! 3. Unordered lists (runs of `- ` lines become `<ul>` blocks)
//! 4. Paragraphs (`\n\n` boundaries plus one outer `<p>` pair)
//! 5. Code fences (each fence toggles the code macro open / closed)
//!
//! The conversion is total. Malformed input degrades instead of failing:
//! an odd number of `**` or fences leaves the last tag unclosed, and header
//! closing tags are only emitted where the next lower-numbered marker starts
//! a line. Converting already converted output is not a fixed point.

/// Header replacements, applied in order across the whole document.
///
/// Closing tags are driven by the *next* marker at a line start, not by what
/// is open, so `# Title\n## Sub` becomes `<h1>Title</h3>\n<h2> Sub`.
pub const HEADER_RULES: [(&str, &str); 5] = [
    ("### ", "<h3>"),
    ("\n##", "</h3>\n<h2>"),
    ("## ", "<h2>"),
    ("\n#", "</h2>\n<h1>"),
    ("# ", "<h1>"),
];

const BOLD_MARKER: &str = "**";
const STRONG_OPEN: &str = "<strong>";
const STRONG_CLOSE: &str = "</strong>";

const LIST_ITEM_PREFIX: &str = "- ";
const LIST_OPEN: &str = "<ul>";
const LIST_CLOSE: &str = "</ul>";

const PARAGRAPH_BREAK: &str = "\n\n";
const PARAGRAPH_BOUNDARY: &str = "</p><p>";

const CODE_FENCE: &str = "```";
pub const CODE_MACRO_OPEN: &str =
    r#"<ac:structured-macro ac:name="code"><ac:plain-text-body><![CDATA["#;
pub const CODE_MACRO_CLOSE: &str = "]]></ac:plain-text-body></ac:structured-macro>";

/// Convert Markdown-flavoured text to Confluence storage markup.
pub fn convert(text: &str) -> String {
    let html = convert_headers(text);
    let html = toggle_markers(&html, BOLD_MARKER, STRONG_OPEN, STRONG_CLOSE);
    let html = convert_lists(&html);
    let html = wrap_paragraphs(&html);
    toggle_markers(&html, CODE_FENCE, CODE_MACRO_OPEN, CODE_MACRO_CLOSE)
}

fn convert_headers(text: &str) -> String {
    HEADER_RULES
        .iter()
        .fold(text.to_string(), |html, (marker, tag)| html.replace(marker, tag))
}

/// Replace each occurrence of `marker`, scanning left to right, alternately
/// with `open` and `close`. An odd count leaves a trailing `open` unmatched.
fn toggle_markers(text: &str, marker: &str, open: &str, close: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut inside = false;
    let mut rest = text;

    while let Some(pos) = rest.find(marker) {
        result.push_str(&rest[..pos]);
        result.push_str(if inside { close } else { open });
        inside = !inside;
        rest = &rest[pos + marker.len()..];
    }

    result.push_str(rest);
    result
}

fn convert_lists(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in text.split('\n') {
        let stripped = line.trim();
        if let Some(item) = stripped.strip_prefix(LIST_ITEM_PREFIX) {
            if !in_list {
                lines.push(LIST_OPEN.to_string());
                in_list = true;
            }
            lines.push(format!("<li>{}</li>", item));
        } else {
            if in_list {
                lines.push(LIST_CLOSE.to_string());
                in_list = false;
            }
            lines.push(line.to_string());
        }
    }

    if in_list {
        lines.push(LIST_CLOSE.to_string());
    }

    lines.join("\n")
}

fn wrap_paragraphs(text: &str) -> String {
    format!("<p>{}</p>", text.replace(PARAGRAPH_BREAK, PARAGRAPH_BOUNDARY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_empty_paragraph() {
        assert_eq!(convert(""), "<p></p>");
    }

    #[test]
    fn test_bold_pair() {
        assert_eq!(convert("**bold**"), "<p><strong>bold</strong></p>");
    }

    #[test]
    fn test_odd_bold_markers_leave_open_tag() {
        let html = convert("**a**b**");
        assert_eq!(html, "<p><strong>a</strong>b<strong></p>");
        assert_eq!(html.matches(STRONG_OPEN).count(), 2);
        assert_eq!(html.matches(STRONG_CLOSE).count(), 1);
    }

    #[test]
    fn test_list_block() {
        assert_eq!(
            convert("- x\n- y\n- z"),
            "<p><ul>\n<li>x</li>\n<li>y</li>\n<li>z</li>\n</ul></p>"
        );
    }

    #[test]
    fn test_list_closed_before_following_text() {
        assert_eq!(
            convert("Intro\n\n- a\n- b\n\nOutro"),
            "<p>Intro</p><p><ul>\n<li>a</li>\n<li>b</li>\n</ul></p><p>Outro</p>"
        );
    }

    #[test]
    fn test_indented_list_items_are_trimmed() {
        assert_eq!(
            convert("  - one\n\t- two"),
            "<p><ul>\n<li>one</li>\n<li>two</li>\n</ul></p>"
        );
    }

    #[test]
    fn test_bare_dash_is_not_a_list_item() {
        assert_eq!(convert("-\n- "), "<p>-\n- </p>");
    }

    #[test]
    fn test_header_closed_by_next_marker() {
        assert_eq!(convert("# Title\n## Sub"), "<p><h1>Title</h3>\n<h2> Sub</p>");
    }

    #[test]
    fn test_header_cascade() {
        assert_eq!(
            convert("### A\n## B\n# C"),
            "<p><h3>A</h3>\n<h2> B</h2>\n<h1> C</p>"
        );
    }

    #[test]
    fn test_header_without_closing_marker_stays_open() {
        let html = convert("## Plan\n\nText **x**\n\n### Deep");
        assert_eq!(
            html,
            "<p><h2>Plan</p><p>Text <strong>x</strong></p><p><h3>Deep</p>"
        );
        assert!(!html.contains("</h2>"));
        assert!(!html.contains("</h3>"));
    }

    #[test]
    fn test_mid_line_hash_is_replaced_globally() {
        assert_eq!(convert("C# rocks"), "<p>C<h1>rocks</p>");
    }

    #[test]
    fn test_code_fences_alternate() {
        let html = convert("```\nlet x = 1;\n```");
        assert_eq!(
            html,
            format!("<p>{}\nlet x = 1;\n{}</p>", CODE_MACRO_OPEN, CODE_MACRO_CLOSE)
        );
    }

    #[test]
    fn test_odd_code_fence_leaves_macro_open() {
        let html = convert("```a``` and ```b");
        assert_eq!(html.matches(CODE_MACRO_OPEN).count(), 2);
        assert_eq!(html.matches(CODE_MACRO_CLOSE).count(), 1);
        assert!(html.ends_with("b</p>"));
    }

    #[test]
    fn test_bold_inside_list_item() {
        assert_eq!(
            convert("- **Risk:** low"),
            "<p><ul>\n<li><strong>Risk:</strong> low</li>\n</ul></p>"
        );
    }

    #[test]
    fn test_toggle_markers_does_not_overlap() {
        assert_eq!(toggle_markers("***", "**", "[", "]"), "[*");
        assert_eq!(toggle_markers("a*****", "**", "[", "]"), "a[]*");
    }
}
