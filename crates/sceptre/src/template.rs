//! Minimal interpolating templates used by file-based pages and the root document.
//!
//! A template is literal HTML containing `{prop}` placeholders, where `prop` is made of ASCII letters, digits, `_`, `-` or `.`.
//! Any other brace is kept as-is, and so is the content of `<script>` and `<style>` elements, placeholders included.
//! A literal `{name}` can be written as `\{name}`.
use maud::{Markup, PreEscaped, Render};
use serde_json::Value;

use crate::props::Props;

/// Elements whose content is never interpolated.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Prop(String),
}

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Returns the placeholder name starting right after a `{` at the beginning of `rest`, if `rest` holds a complete placeholder.
fn placeholder_at(rest: &str) -> Option<&str> {
    let end = rest.find(|c: char| !is_placeholder_char(c))?;

    if end == 0 || !rest[end..].starts_with('}') {
        return None;
    }

    Some(&rest[..end])
}

/// Position of the first `<tag` opening tag in `lower`, which must be lowercase already.
fn find_open_tag(lower: &str, tag: &str) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut from = 0;

    while let Some(offset) = lower[from..].find(&needle) {
        let start = from + offset;
        let after = &lower[start + needle.len()..];

        if after.is_empty()
            || after.starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace())
        {
            return Some(start);
        }

        from = start + needle.len();
    }

    None
}

/// Splits `source` around the content of its first `<script>` or `<style>` element.
///
/// Returns the markup up to and including the opening tag, the raw content, and everything from the closing tag on.
fn split_raw_text(source: &str) -> Option<(&str, &str, &str)> {
    // ASCII lowercasing keeps byte offsets intact
    let lower = source.to_ascii_lowercase();

    let (start, tag) = RAW_TEXT_ELEMENTS
        .iter()
        .filter_map(|tag| find_open_tag(&lower, tag).map(|start| (start, *tag)))
        .min_by_key(|(start, _)| *start)?;

    let content_start = lower[start..]
        .find('>')
        .map_or(source.len(), |end| start + end + 1);
    let content_end = lower[content_start..]
        .find(&format!("</{tag}"))
        .map_or(source.len(), |end| content_start + end);

    Some((
        &source[..content_start],
        &source[content_start..content_end],
        &source[content_end..],
    ))
}

fn parse_markup(source: &str, text: &mut String, segments: &mut Vec<Segment>) {
    let mut rest = source;

    while let Some(brace) = rest.find('{') {
        let (before, after) = rest.split_at(brace);
        let after = &after[1..];

        if let Some(escaped) = before.strip_suffix('\\') {
            text.push_str(escaped);
            text.push('{');
            rest = after;
            continue;
        }

        text.push_str(before);

        match placeholder_at(after) {
            Some(prop) => {
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(text)));
                }
                segments.push(Segment::Prop(prop.to_string()));
                rest = &after[prop.len() + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }

    text.push_str(rest);
}

impl Template {
    pub fn parse(name: impl Into<String>, source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some((markup, raw, after)) = split_raw_text(rest) {
            parse_markup(markup, &mut text, &mut segments);
            text.push_str(raw);
            rest = after;
        }

        parse_markup(rest, &mut text, &mut segments);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Self {
            name: name.into(),
            segments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of every prop this template interpolates, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Prop(prop) => Some(prop.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Renders the template, escaping every interpolated value. Missing props render as nothing.
    pub fn render(&self, props: &Props) -> Markup {
        let mut output = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Prop(prop) => match props.get(prop) {
                    Some(Value::String(value)) => value.as_str().render_to(&mut output),
                    Some(Value::Null) | None => {}
                    Some(value) => value.to_string().render_to(&mut output),
                },
            }
        }

        PreEscaped(output)
    }
}
