//! Command patterns - literal text interleaved with `{name}` placeholders

use std::collections::HashMap;
use regex_lite::Regex;
use crate::application::errors::BotError;

/// Parameters captured by a successful pattern match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    params: HashMap<String, String>,
}

impl MatchResult {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// A compiled command pattern, anchored at both ends
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl Pattern {
    pub fn compile(source: impl Into<String>) -> Result<Self, BotError> {
        let source = source.into();
        let segments = parse_segments(&source);

        let mut names: Vec<String> = Vec::new();
        let mut expr = String::from("^");
        for (i, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => expr.push_str(&regex_lite::escape(text)),
                Segment::Placeholder(name) => {
                    if names.iter().any(|n| n == name) {
                        return Err(BotError::Pattern(format!(
                            "duplicate placeholder '{}' in '{}'",
                            name, source
                        )));
                    }
                    let capture = if i + 1 == segments.len() { "(?s:.+)" } else { r"\S+" };
                    expr.push_str(&format!("(?P<{}>{})", name, capture));
                    names.push(name.to_string());
                }
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr)
            .map_err(|e| BotError::Pattern(format!("invalid pattern '{}': {}", source, e)))?;

        Ok(Self { source, regex, names })
    }

    /// The pattern exactly as registered
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> &[String] {
        &self.names
    }

    /// Match the whole of `text` against the pattern
    pub fn matches(&self, text: &str) -> Option<MatchResult> {
        let caps = self.regex.captures(text)?;
        let params = self
            .names
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();
        Some(MatchResult { params })
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_segments(source: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(open) = source[cursor..].find('{').map(|i| cursor + i) {
        let Some(close) = source[open..].find('}').map(|i| open + i) else {
            break;
        };
        let name = &source[open + 1..close];
        if is_placeholder_name(name) {
            if literal_start < open {
                segments.push(Segment::Literal(&source[literal_start..open]));
            }
            segments.push(Segment::Placeholder(name));
            literal_start = close + 1;
            cursor = close + 1;
        } else {
            cursor = open + 1;
        }
    }

    if literal_start < source.len() {
        segments.push(Segment::Literal(&source[literal_start..]));
    }
    segments
}
