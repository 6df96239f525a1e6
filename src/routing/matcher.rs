//! Path template parsing and matching.
//!
//! # Responsibilities
//! - Parse templates such as `/echo/{id}` or `/files/{name=**}`
//! - Match a request path against a template and capture variables
//! - Expose specificity (literal segment count) for route ranking
//!
//! # Design Decisions
//! - Literal matching is exact and case-sensitive
//! - A variable matches exactly one non-empty segment
//! - A wildcard is terminal and captures one or more segments, `/` included
//! - Captures are returned raw; binding percent-decodes them
//! - No regex: matching is a single pass over the segments

use std::fmt;
use std::str::FromStr;

/// Error parsing a path template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("template '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("template '{0}' has an unbalanced or misplaced brace")]
    UnbalancedBrace(String),

    #[error("template '{template}' has an invalid variable '{variable}'")]
    InvalidVariable { template: String, variable: String },

    #[error("template '{template}' binds '{variable}' more than once")]
    DuplicateVariable { template: String, variable: String },

    #[error("template '{0}' has a wildcard that is not the final segment")]
    WildcardNotLast(String),
}

/// One segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Single-segment variable named by the field path it binds.
    Variable(String),
    /// Terminal variable capturing the rest of the path.
    Wildcard(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| TemplateError::MissingLeadingSlash(template.to_string()))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if matches!(segments.last(), Some(Segment::Wildcard(_))) {
                    return Err(TemplateError::WildcardNotLast(template.to_string()));
                }
                segments.push(parse_segment(template, part)?);
            }
        }

        let mut seen = Vec::new();
        for name in segments.iter().filter_map(variable_name) {
            if seen.contains(&name) {
                return Err(TemplateError::DuplicateVariable {
                    template: template.to_string(),
                    variable: name.to_string(),
                });
            }
            seen.push(name);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variable names in template order, wildcard included.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(variable_name)
    }

    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }

    /// Match `path`, returning raw captures in variable order.
    pub fn matches(&self, path: &str) -> Option<Vec<String>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut captures = Vec::new();
        let mut index = 0;
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(index) != Some(&literal.as_str()) {
                        return None;
                    }
                    index += 1;
                }
                Segment::Variable(_) => {
                    let part = parts.get(index).filter(|p| !p.is_empty())?;
                    captures.push(part.to_string());
                    index += 1;
                }
                Segment::Wildcard(_) => {
                    let remainder = parts.get(index..).filter(|r| !r.is_empty())?;
                    let joined = remainder.join("/");
                    if joined.is_empty() {
                        return None;
                    }
                    captures.push(joined);
                    index = parts.len();
                }
            }
        }

        (index == parts.len()).then_some(captures)
    }

    /// Shape used to detect duplicate registrations: variable names ignored.
    pub(crate) fn shape(&self) -> String {
        let mut shape = String::new();
        for segment in &self.segments {
            shape.push('/');
            match segment {
                Segment::Literal(literal) => shape.push_str(literal),
                Segment::Variable(_) => shape.push_str("{}"),
                Segment::Wildcard(_) => shape.push_str("{**}"),
            }
        }
        shape
    }
}

impl FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(template: &str, part: &str) -> Result<Segment, TemplateError> {
    if part.is_empty() {
        return Err(TemplateError::EmptySegment(template.to_string()));
    }

    let Some(inner) = part.strip_prefix('{') else {
        if part.contains(['{', '}']) {
            return Err(TemplateError::UnbalancedBrace(template.to_string()));
        }
        return Ok(Segment::Literal(part.to_string()));
    };
    let inner = inner
        .strip_suffix('}')
        .filter(|i| !i.contains(['{', '}']))
        .ok_or_else(|| TemplateError::UnbalancedBrace(template.to_string()))?;

    let invalid = || TemplateError::InvalidVariable {
        template: template.to_string(),
        variable: inner.to_string(),
    };

    let (name, pattern) = match inner.split_once('=') {
        Some((name, pattern)) => (name, Some(pattern)),
        None => (inner, None),
    };
    let valid_name = !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if !valid_name {
        return Err(invalid());
    }

    match pattern {
        None | Some("*") => Ok(Segment::Variable(name.to_string())),
        Some("**") => Ok(Segment::Wildcard(name.to_string())),
        Some(_) => Err(invalid()),
    }
}

fn variable_name(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Literal(_) => None,
        Segment::Variable(name) | Segment::Wildcard(name) => Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let t = PathTemplate::parse("/echo/{echo.id}/raw/{rest=**}").unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("echo".into()),
                Segment::Variable("echo.id".into()),
                Segment::Literal("raw".into()),
                Segment::Wildcard("rest".into()),
            ]
        );
        assert_eq!(t.literal_count(), 2);
        assert!(t.has_wildcard());
        assert_eq!(t.variables().collect::<Vec<_>>(), vec!["echo.id", "rest"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PathTemplate::parse("echo"),
            Err(TemplateError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/echo//x"),
            Err(TemplateError::EmptySegment(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/echo/{id"),
            Err(TemplateError::UnbalancedBrace(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/echo/{}"),
            Err(TemplateError::InvalidVariable { .. })
        ));
        assert!(matches!(
            PathTemplate::parse("/echo/{id=a/b}"),
            Err(TemplateError::UnbalancedBrace(_)) | Err(TemplateError::InvalidVariable { .. })
        ));
        assert!(matches!(
            PathTemplate::parse("/{a=**}/x"),
            Err(TemplateError::WildcardNotLast(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/{a}/{a}"),
            Err(TemplateError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn test_literal_and_variable_matching() {
        let t = PathTemplate::parse("/echo/{id}").unwrap();
        assert_eq!(t.matches("/echo/1"), Some(vec!["1".to_string()]));
        assert_eq!(t.matches("/echo/x"), Some(vec!["x".to_string()]));
        assert_eq!(t.matches("/echo"), None);
        assert_eq!(t.matches("/echo/"), None);
        assert_eq!(t.matches("/echo/1/2"), None);
        assert_eq!(t.matches("/Echo/1"), None);
    }

    #[test]
    fn test_root_template() {
        let t = PathTemplate::parse("/").unwrap();
        assert_eq!(t.matches("/"), Some(vec![]));
        assert_eq!(t.matches("/a"), None);
    }

    #[test]
    fn test_wildcard_captures_remainder() {
        let t = PathTemplate::parse("/files/{name=**}").unwrap();
        assert_eq!(t.matches("/files/a/b/c.txt"), Some(vec!["a/b/c.txt".to_string()]));
        assert_eq!(t.matches("/files/a"), Some(vec!["a".to_string()]));
        assert_eq!(t.matches("/files"), None);
        assert_eq!(t.matches("/files/"), None);
    }

    #[test]
    fn test_captures_are_raw() {
        let t = PathTemplate::parse("/echo/contents/{content}").unwrap();
        assert_eq!(
            t.matches("/echo/contents/hello%20world"),
            Some(vec!["hello%20world".to_string()])
        );
    }

    #[test]
    fn test_shape_ignores_variable_names() {
        let a = PathTemplate::parse("/echo/{id}").unwrap();
        let b = PathTemplate::parse("/echo/{echo.id}").unwrap();
        assert_eq!(a.shape(), b.shape());
    }
}
