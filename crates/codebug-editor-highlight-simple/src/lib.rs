//! `codebug-editor-highlight-simple` - Simple (regex-based) highlighting engines for
//! `codebug-editor`.
//!
//! The engines here produce the overlay markup expected by
//! [`codebug_editor::HighlightingEngine`]: escaped text with `<span class="token ...">`
//! wrappers. They are not parsers; a handful of regex rules per language is enough to colour
//! source code for review.

use codebug_editor::{HighlightError, HighlightingEngine, escape_html};
use regex::Regex;
use std::ops::Range;

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    class: String,
    capture_group: Option<usize>,
}

impl RegexRule {
    pub fn new(pattern: &str, class: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            class: class.into(),
            capture_group: None,
        })
    }

    /// Highlight only a capture group of each match.
    ///
    /// Example (Python function name):
    /// - pattern: `\bdef\s+([A-Za-z_]\w*)`
    /// - capture_group: `1` (the name)
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

/// A highlighted range of the source (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub range: Range<usize>,
    pub class: &'a str,
}

/// A simple regex-based syntax highlighter.
///
/// Rules run over the whole text, so a match may span several lines (triple-quoted strings).
/// When matches overlap, the one starting first wins; among matches starting at the same
/// offset, the earlier rule wins.
#[derive(Debug, Clone)]
pub struct RegexHighlighter {
    name: String,
    rules: Vec<RegexRule>,
}

impl RegexHighlighter {
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self {
            name: "regex".to_string(),
            rules,
        }
    }

    /// Set the engine name reported through [`HighlightingEngine::name`].
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// Run all rules over `source` and return the selected, non-overlapping tokens in order.
    pub fn tokens(&self, source: &str) -> Vec<Token<'_>> {
        // (start, end, rule index)
        let mut candidates: Vec<(usize, usize, usize)> = Vec::new();

        for (order, rule) in self.rules.iter().enumerate() {
            if let Some(group) = rule.capture_group {
                for caps in rule.regex.captures_iter(source) {
                    let Some(m) = caps.get(group) else {
                        continue;
                    };
                    candidates.push((m.start(), m.end(), order));
                }
            } else {
                for m in rule.regex.find_iter(source) {
                    candidates.push((m.start(), m.end(), order));
                }
            }
        }

        candidates.sort_unstable_by_key(|&(start, _, order)| (start, order));

        let mut tokens = Vec::new();
        let mut covered = 0;
        for (start, end, order) in candidates {
            if start < covered || start >= end {
                continue;
            }
            covered = end;
            tokens.push(Token {
                range: start..end,
                class: &self.rules[order].class,
            });
        }
        tokens
    }

    /// Render `source` as overlay markup.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() * 2);
        let mut pos = 0;
        for token in self.tokens(source) {
            out.push_str(&escape_html(&source[pos..token.range.start]));
            out.push_str("<span class=\"token ");
            out.push_str(token.class);
            out.push_str("\">");
            out.push_str(&escape_html(&source[token.range.clone()]));
            out.push_str("</span>");
            pos = token.range.end;
        }
        out.push_str(&escape_html(&source[pos..]));
        out
    }

    /// A small default Python grammar.
    pub fn python_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RegexRule::new(r"#[^\n]*", TOKEN_COMMENT)?,
            // Triple-quoted strings may span lines.
            RegexRule::new(
                r#"(?s)(?:\b[rRbBuUfF]{1,2})?(?:""".*?"""|'''.*?''')"#,
                TOKEN_STRING,
            )?,
            RegexRule::new(
                r#"(?:\b[rRbBuUfF]{1,2})?(?:"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*')"#,
                TOKEN_STRING,
            )?,
            RegexRule::new(r"(?m)^[ \t]*(@[\w.]+)", TOKEN_DECORATOR)?.with_capture_group(1),
            RegexRule::new(r"\bdef\s+([A-Za-z_]\w*)", TOKEN_FUNCTION)?.with_capture_group(1),
            RegexRule::new(r"\bclass\s+([A-Za-z_]\w*)", TOKEN_CLASS_NAME)?.with_capture_group(1),
            RegexRule::new(
                r"\b(?:and|as|assert|async|await|break|case|class|continue|def|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|match|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b",
                TOKEN_KEYWORD,
            )?,
            RegexRule::new(r"\b(?:True|False|None)\b", TOKEN_BOOLEAN)?,
            RegexRule::new(
                r"\b(?:abs|all|any|bool|dict|dir|enumerate|filter|float|format|getattr|hasattr|input|int|isinstance|iter|len|list|map|max|min|next|object|open|print|range|repr|reversed|round|set|setattr|sorted|str|sum|super|tuple|type|zip)\b",
                TOKEN_BUILTIN,
            )?,
            RegexRule::new(
                r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?j?)\b",
                TOKEN_NUMBER,
            )?,
            RegexRule::new(r"[-+*/%=<>!&|^~@]+", TOKEN_OPERATOR)?,
            RegexRule::new(r"[()\[\]{}:,.;]", TOKEN_PUNCTUATION)?,
        ])
        .with_name("python"))
    }

    /// A small default JSON grammar (keys, strings, numbers, booleans, null).
    pub fn json_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RegexRule::new(r#"("(?:\\.|[^"\\\n])*")\s*:"#, TOKEN_PROPERTY)?.with_capture_group(1),
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, TOKEN_STRING)?,
            RegexRule::new(
                r#"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?"#,
                TOKEN_NUMBER,
            )?,
            RegexRule::new(r#"\b(?:true|false)\b"#, TOKEN_BOOLEAN)?,
            RegexRule::new(r#"\bnull\b"#, TOKEN_NULL)?,
            RegexRule::new(r"[{}\[\],:]", TOKEN_PUNCTUATION)?,
        ])
        .with_name("json"))
    }
}

impl HighlightingEngine for RegexHighlighter {
    fn name(&self) -> &str {
        &self.name
    }

    fn highlight(&self, source: &str) -> Result<String, HighlightError> {
        Ok(self.render(source))
    }
}

/// Token class names used by the default grammars.
///
/// These are only identifiers. The front-end is expected to map them to actual colors.
pub const TOKEN_COMMENT: &str = "comment";
pub const TOKEN_STRING: &str = "string";
pub const TOKEN_DECORATOR: &str = "decorator";
pub const TOKEN_FUNCTION: &str = "function";
pub const TOKEN_CLASS_NAME: &str = "class-name";
pub const TOKEN_KEYWORD: &str = "keyword";
pub const TOKEN_BOOLEAN: &str = "boolean";
pub const TOKEN_BUILTIN: &str = "builtin";
pub const TOKEN_NUMBER: &str = "number";
pub const TOKEN_OPERATOR: &str = "operator";
pub const TOKEN_PUNCTUATION: &str = "punctuation";
pub const TOKEN_PROPERTY: &str = "property";
pub const TOKEN_NULL: &str = "null";
