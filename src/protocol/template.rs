//! Command templates.
//!
//! A template is literal command text with positional placeholders:
//!
//! - `{}` renders the value in its plain form (`0`/`1` for booleans, nothing for unit).
//! - `{:.Nf}` renders a fixed-point decimal with `N` fractional digits.
//!
//! The device parses commands by fixed textual convention, so the rendered
//! text must match the template byte for byte.
use thiserror::Error;

use crate::Value;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unterminated placeholder in template '{0}'")]
    Unterminated(String),

    #[error("unsupported format spec '{spec}' in template '{template}'")]
    UnsupportedSpec { template: String, spec: String },

    #[error("template '{template}' has {expected} placeholders, got {found} values")]
    PlaceholderCount {
        template: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder { precision: Option<usize> },
}

/// A parsed command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'a> {
    source: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> Template<'a> {
    pub fn parse(source: &'a str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(&rest[..open]));
            }
            let close = rest[open..]
                .find('}')
                .ok_or_else(|| TemplateError::Unterminated(source.to_string()))?
                + open;

            let spec = &rest[open + 1..close];
            let precision = match spec {
                "" => None,
                s => Some(parse_precision(s).ok_or_else(|| TemplateError::UnsupportedSpec {
                    template: source.to_string(),
                    spec: s.to_string(),
                })?),
            };
            segments.push(Segment::Placeholder { precision });
            rest = &rest[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Number of positional placeholders.
    pub fn placeholders(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder { .. }))
            .count()
    }

    /// Substitutes `values` into the placeholders in order.
    pub fn render(&self, values: &[Value]) -> Result<String, TemplateError> {
        if values.len() != self.placeholders() {
            return Err(TemplateError::PlaceholderCount {
                template: self.source.to_string(),
                expected: self.placeholders(),
                found: values.len(),
            });
        }

        let mut out = String::with_capacity(self.source.len() + 16);
        let mut values = values.iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { precision } => {
                    if let Some(value) = values.next() {
                        out.push_str(&render_value(value, *precision));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Splits a rendered command back into the raw text of each placeholder.
    ///
    /// Returns `None` when `command` was not produced by this template. A
    /// placeholder extends up to the next literal segment, so two adjacent
    /// placeholders never match.
    pub fn captures<'c>(&self, command: &'c str) -> Option<Vec<&'c str>> {
        let mut captures = Vec::with_capacity(self.placeholders());
        let mut rest = command;
        let mut segments = self.segments.iter().peekable();

        while let Some(segment) = segments.next() {
            match segment {
                Segment::Literal(text) => rest = rest.strip_prefix(text)?,
                Segment::Placeholder { .. } => match segments.peek() {
                    None => {
                        captures.push(rest);
                        rest = "";
                    }
                    Some(Segment::Literal(next)) => {
                        let end = rest.find(next)?;
                        captures.push(&rest[..end]);
                        rest = &rest[end..];
                    }
                    Some(Segment::Placeholder { .. }) => return None,
                },
            }
        }

        rest.is_empty().then_some(captures)
    }
}

fn parse_precision(spec: &str) -> Option<usize> {
    spec.strip_prefix(":.")?.strip_suffix('f')?.parse().ok()
}

fn render_value(value: &Value, precision: Option<usize>) -> String {
    match (value, precision) {
        (Value::Float(v), Some(p)) => format!("{v:.p$}"),
        (Value::Int(i), Some(p)) => format!("{:.p$}", *i as f64),
        (Value::Bool(b), _) => u8::from(*b).to_string(),
        (v, _) => v.to_string(),
    }
}
