//! Reading rendered overlay markup back into styled spans.
//!
//! Front-ends that do not speak HTML (the terminal UI, tests) use [`parse_markup`] to turn the
//! overlay's markup into lines of [`MarkupSpan`]s. Only `<span class="...">` is meaningful;
//! any other tag is dropped, and the five common entities are decoded.

/// A run of text sharing the same (nested) classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    /// Decoded text.
    pub text: String,
    /// Classes of all enclosing spans, outermost first.
    pub classes: Vec<String>,
}

impl MarkupSpan {
    /// Whether any enclosing span carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// One rendered line.
pub type MarkupLine = Vec<MarkupSpan>;

/// Split markup into lines of spans.
///
/// Spans that cross a line break continue on the next line with the same classes.
pub fn parse_markup(markup: &str) -> Vec<MarkupLine> {
    let mut lines: Vec<MarkupLine> = vec![Vec::new()];
    // Each open span contributes zero or more classes.
    let mut stack: Vec<Vec<String>> = Vec::new();
    let mut buf = String::new();
    let mut rest = markup;

    while !rest.is_empty() {
        let Some(next) = rest.find(['<', '&', '\n']) else {
            buf.push_str(rest);
            break;
        };
        buf.push_str(&rest[..next]);
        rest = &rest[next..];

        if rest.starts_with('\n') {
            flush(&mut lines, &mut buf, &stack);
            lines.push(Vec::new());
            rest = &rest[1..];
        } else if rest.starts_with('&') {
            let (decoded, consumed) = decode_entity(rest);
            buf.push_str(decoded);
            rest = &rest[consumed..];
        } else {
            let Some(close) = rest.find('>') else {
                // Unterminated tag: keep it as literal text.
                buf.push_str(rest);
                break;
            };
            let tag = &rest[1..close];
            rest = &rest[close + 1..];
            flush(&mut lines, &mut buf, &stack);

            if tag.starts_with('/') {
                if tag[1..].trim().eq_ignore_ascii_case("span") {
                    stack.pop();
                }
            } else if tag_name(tag).eq_ignore_ascii_case("span") {
                stack.push(class_list(tag));
            }
        }
    }

    flush(&mut lines, &mut buf, &stack);
    lines
}

/// Concatenate the text of all lines, joined with `\n`.
pub fn plain_text(lines: &[MarkupLine]) -> String {
    lines
        .iter()
        .map(|line| line.iter().map(|span| span.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn flush(lines: &mut [MarkupLine], buf: &mut String, stack: &[Vec<String>]) {
    if buf.is_empty() {
        return;
    }
    let classes: Vec<String> = stack.iter().flatten().cloned().collect();
    if let Some(line) = lines.last_mut() {
        match line.last_mut() {
            Some(last) if last.classes == classes => last.text.push_str(buf),
            _ => line.push(MarkupSpan {
                text: buf.clone(),
                classes,
            }),
        }
    }
    buf.clear();
}

fn decode_entity(input: &str) -> (&'static str, usize) {
    const ENTITIES: [(&str, &str); 5] = [
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
    ];
    for (entity, decoded) in ENTITIES {
        if input.starts_with(entity) {
            return (decoded, entity.len());
        }
    }
    ("&", 1)
}

fn tag_name(tag: &str) -> &str {
    tag.split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
}

fn class_list(tag: &str) -> Vec<String> {
    let Some(idx) = tag.find("class=") else {
        return Vec::new();
    };
    let value = &tag[idx + "class=".len()..];
    let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return Vec::new();
    };
    let value = &value[1..];
    let end = value.find(quote).unwrap_or(value.len());
    value[..end].split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span(text: &str, classes: &[&str]) -> MarkupSpan {
        MarkupSpan {
            text: text.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_plain_escaped_text() {
        let lines = parse_markup("a &lt; b &amp;&amp; c\nd &gt; e");
        assert_eq!(
            lines,
            vec![vec![span("a < b && c", &[])], vec![span("d > e", &[])]]
        );
    }

    #[test]
    fn test_nested_spans() {
        let lines = parse_markup(
            r#"<span class="token keyword">def</span> <span class="token function">f<span class="x">()</span></span>:"#,
        );
        assert_eq!(
            lines,
            vec![vec![
                span("def", &["token", "keyword"]),
                span(" ", &[]),
                span("f", &["token", "function"]),
                span("()", &["token", "function", "x"]),
                span(":", &[]),
            ]]
        );
        assert!(lines[0][0].has_class("keyword"));
    }

    #[test]
    fn test_span_crossing_lines_keeps_classes() {
        let lines = parse_markup("<span class=\"token string\">\"\"\"a\nb\"\"\"</span>");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1][0].classes, vec!["token", "string"]);
        assert_eq!(plain_text(&lines), "\"\"\"a\nb\"\"\"");
    }

    #[test]
    fn test_unknown_tags_and_lone_ampersand() {
        let lines = parse_markup("<b>x</b> & y &foo;");
        assert_eq!(plain_text(&lines), "x & y &foo;");
    }

    #[test]
    fn test_empty_lines_preserved() {
        let lines = parse_markup("a\n\nb\n");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].is_empty());
        assert_eq!(plain_text(&lines), "a\n\nb\n");
    }
}
