use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One step of a [`FieldPath`]: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn from_token(token: &str) -> Self {
        match token.parse::<usize>() {
            Ok(index) if is_canonical_index(token) => PathSegment::Index(index),
            _ => PathSegment::Key(token.to_string()),
        }
    }
}

// "01" stays a key so that pointer round-trips are lossless.
fn is_canonical_index(token: &str) -> bool {
    token == "0" || !token.starts_with('0')
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Address of one node inside the content document.
///
/// Paths are built from segments (`FieldPath::root().key("hero").key("name")`,
/// or the [`field_path!`](crate::field_path) macro) or parsed from text. Two
/// textual forms are accepted: a JSON pointer (`/artSeries/0/images`) and a
/// dotted form (`artSeries.0.images`). Purely numeric tokens become indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// Returns a new path with `segment` appended; `self` is left as is.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn parent(&self) -> Option<FieldPath> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// True when `self` equals `other` or addresses a node nested under it.
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    pub fn to_pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in &self.segments {
            pointer.push('/');
            match segment {
                PathSegment::Key(key) => pointer.push_str(&escape_pointer_token(key)),
                PathSegment::Index(index) => pointer.push_str(&index.to_string()),
            }
        }
        pointer
    }

    /// Parses an RFC 6901 pointer. The empty string is the root.
    pub fn from_pointer(pointer: &str) -> Result<Self, PathParseError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let Some(body) = pointer.strip_prefix('/') else {
            return Err(PathParseError::MissingLeadingSlash(pointer.to_string()));
        };
        let segments = body
            .split('/')
            .map(|raw| unescape_pointer_token(raw).map(|token| PathSegment::from_token(&token)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    fn from_dotted(raw: &str) -> Result<Self, PathParseError> {
        let mut segments = Vec::new();
        for token in raw.split('.') {
            if token.is_empty() {
                return Err(PathParseError::EmptySegment(raw.to_string()));
            }
            segments.push(PathSegment::from_token(token));
        }
        Ok(Self { segments })
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('/') {
            Self::from_pointer(trimmed)
        } else {
            Self::from_dotted(trimmed)
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.to_pointer())
    }
}

impl FromIterator<PathSegment> for FieldPath {
    fn from_iter<T: IntoIterator<Item = PathSegment>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("pointer '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),
    #[error("invalid escape sequence in pointer token '{0}'")]
    InvalidEscape(String),
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer_token(token: &str) -> Result<String, PathParseError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PathParseError::InvalidEscape(token.to_string())),
        }
    }
    Ok(out)
}

/// Builds a [`FieldPath`] from a mix of string keys and integer indices.
///
/// ```
/// use folio::field_path;
/// let path = field_path!["artSeries", 0usize, "images"];
/// assert_eq!(path.to_pointer(), "/artSeries/0/images");
/// ```
#[macro_export]
macro_rules! field_path {
    () => { $crate::FieldPath::root() };
    ($($segment:expr),+ $(,)?) => {
        $crate::FieldPath::new(vec![$($crate::PathSegment::from($segment)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pointer_and_dotted_forms_alike() {
        let pointer: FieldPath = "/artSeries/0/images".parse().unwrap();
        let dotted: FieldPath = "artSeries.0.images".parse().unwrap();
        assert_eq!(pointer, dotted);
        assert_eq!(
            pointer.segments(),
            &[
                PathSegment::Key("artSeries".into()),
                PathSegment::Index(0),
                PathSegment::Key("images".into()),
            ]
        );
    }

    #[test]
    fn pointer_escapes_round_trip() {
        let path = FieldPath::root().key("a/b").key("c~d");
        assert_eq!(path.to_pointer(), "/a~1b/c~0d");
        assert_eq!(FieldPath::from_pointer("/a~1b/c~0d").unwrap(), path);
    }

    #[test]
    fn leading_zero_tokens_stay_keys() {
        let path: FieldPath = "/01".parse().unwrap();
        assert_eq!(path.segments(), &[PathSegment::Key("01".into())]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            "hero..name".parse::<FieldPath>(),
            Err(PathParseError::EmptySegment(_))
        ));
        assert!(matches!(
            FieldPath::from_pointer("/bad~2"),
            Err(PathParseError::InvalidEscape(_))
        ));
        assert!(matches!(
            FieldPath::from_pointer("hero"),
            Err(PathParseError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn macro_mixes_keys_and_indices() {
        let path = field_path!["artSeries", 1usize, "images", 0usize, "url"];
        assert_eq!(path.to_pointer(), "/artSeries/1/images/0/url");
        assert_eq!(path.parent().unwrap().to_pointer(), "/artSeries/1/images/0");
        assert!(path.starts_with(&field_path!["artSeries", 1usize]));
        assert!(!path.starts_with(&field_path!["artSeries", 0usize]));
    }
}
