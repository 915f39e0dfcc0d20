//! Path templates: compilation and matching.
//!
//! A template is a `/`-separated list of segments. Each segment is either a
//! literal, which must appear verbatim, or a `{name}` placeholder, which
//! captures one non-empty run of `[A-Za-z0-9_]`. Matching is anchored at
//! both ends and the segment count is fixed.
//!
//! ```text
//! /api/pessoas/{id}   ──parse──▶  [Lit("api"), Lit("pessoas"), Param("id")]
//! /api/pessoas/42     ──match──▶  Some({id: "42"})
//! /api/pessoas/42/x   ──match──▶  None
//! ```

use std::fmt;

/// Why a template failed to compile.
///
/// Route tables are static and developer-controlled, so every variant is a
/// programming error surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route `{0}` must be empty or start with `/`")]
    MissingLeadingSlash(String),

    #[error("route `{template}`: malformed segment `{segment}`")]
    MalformedSegment { template: String, segment: String },

    #[error("route `{template}`: invalid placeholder name `{name}`")]
    InvalidPlaceholder { template: String, name: String },

    #[error("route `{template}`: placeholder `{name}` appears more than once")]
    DuplicatePlaceholder { template: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let trimmed = trim_path(template);
        if !trimmed.is_empty() && !trimmed.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(template.to_owned()));
        }

        let mut segments = Vec::new();
        for raw in trimmed.split('/') {
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    if name.is_empty() || !name.chars().all(is_param_char) {
                        return Err(RouteError::InvalidPlaceholder {
                            template: template.to_owned(),
                            name: name.to_owned(),
                        });
                    }
                    if segments.iter().any(|s| matches!(s, Segment::Param(n) if n == name)) {
                        return Err(RouteError::DuplicatePlaceholder {
                            template: template.to_owned(),
                            name: name.to_owned(),
                        });
                    }
                    Segment::Param(name.to_owned())
                }
                None if raw.contains(['{', '}']) => {
                    return Err(RouteError::MalformedSegment {
                        template: template.to_owned(),
                        segment: raw.to_owned(),
                    });
                }
                None => Segment::Literal(raw.to_owned()),
            };
            segments.push(segment);
        }

        Ok(Self { source: trimmed.to_owned(), segments })
    }

    /// The template text, trailing slashes removed.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.source.starts_with(prefix)
    }

    /// Placeholder names in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a whole, already-trimmed path and extracts its parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut params = Params::default();
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    if part.is_empty() || !part.chars().all(is_param_char) {
                        return None;
                    }
                    params.push(name, part);
                }
            }
        }

        // Anchored: the path must not have segments left over.
        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Removes trailing slashes. A lone `/` becomes the empty path.
pub fn trim_path(path: &str) -> &str {
    path.trim_end_matches('/')
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters extracted by a match, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_owned(), value.to_owned()));
    }

    /// Value of the placeholder `name`, if the template has one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Value at `index`, counting placeholders left to right.
    pub fn at(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
