use serde::{Deserialize, Serialize};

use crate::error::{Result, ShortenerError};
use crate::value::Key;

#[derive(Debug, Clone)]
enum SegmentMatcher {
    Any,
    Exact(String),
    Glob(glob::Pattern),
}

impl SegmentMatcher {
    fn compile(segment: &str, pattern: &str) -> Result<Self> {
        if segment == "*" {
            return Ok(Self::Any);
        }
        if !segment.contains(|c: char| matches!(c, '*' | '?' | '[')) {
            return Ok(Self::Exact(segment.to_string()));
        }
        glob::Pattern::new(segment)
            .map(Self::Glob)
            .map_err(|err| ShortenerError::invalid_pattern(pattern, err.to_string()))
    }

    fn matches(&self, key: &Key) -> bool {
        match (self, key) {
            (Self::Any, _) => true,
            (Self::Exact(text), Key::Str(s)) => text == s,
            (Self::Exact(text), Key::Int(_)) => *text == key.to_string(),
            (Self::Glob(pattern), _) => pattern.matches(&key.to_string()),
        }
    }
}

/// Key path a value must sit at to be shortened.
///
/// Matching is exact-length: every segment must match the key at the same
/// position. A segment of `*` matches any key, segments containing glob
/// metacharacters are matched as globs against the key text, and anything else
/// must equal the key text (so `"3"` matches both `Key::Int(3)` and
/// `Key::Str("3")`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawKeyPattern", into = "RawKeyPattern")]
pub struct KeyPattern {
    segments: Vec<String>,
    matchers: Vec<SegmentMatcher>,
}

impl KeyPattern {
    pub fn new<S: AsRef<str>>(segments: impl IntoIterator<Item = S>) -> Result<Self> {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let display = segments.join(".");
        if segments.is_empty() {
            return Err(ShortenerError::invalid_pattern(display, "pattern has no segments"));
        }

        let matchers = segments
            .iter()
            .map(|segment| SegmentMatcher::compile(segment, &display))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments, matchers })
    }

    /// Parse a dotted pattern such as `request.POST` or `body.*.json`
    pub fn parse(dotted: &str) -> Result<Self> {
        let dotted = dotted.trim();
        if dotted.is_empty() {
            return Err(ShortenerError::invalid_pattern(dotted, "pattern has no segments"));
        }
        Self::new(dotted.split('.'))
    }

    /// Pattern whose segments are compared verbatim, wildcards included.
    ///
    /// Segments are stored glob-escaped (`*` becomes `[*]`), so the pattern
    /// serializes to text that parses back to the same matcher.
    #[must_use]
    pub fn literal(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| glob::Pattern::escape(s)).collect(),
            matchers: segments
                .iter()
                .map(|s| SegmentMatcher::Exact((*s).to_string()))
                .collect(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn matches(&self, key_path: &[Key]) -> bool {
        key_path.len() == self.matchers.len()
            && self
                .matchers
                .iter()
                .zip(key_path)
                .all(|(matcher, key)| matcher.matches(key))
    }
}

/// Segments are the pattern's source text; equal text compiles to equal matchers.
impl PartialEq for KeyPattern {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawKeyPattern {
    Dotted(String),
    Segments(Vec<String>),
}

impl TryFrom<RawKeyPattern> for KeyPattern {
    type Error = ShortenerError;

    fn try_from(raw: RawKeyPattern) -> Result<Self> {
        match raw {
            RawKeyPattern::Dotted(dotted) => Self::parse(&dotted),
            RawKeyPattern::Segments(segments) => Self::new(segments),
        }
    }
}

impl From<KeyPattern> for RawKeyPattern {
    fn from(pattern: KeyPattern) -> Self {
        Self::Segments(pattern.segments)
    }
}

/// Configured key patterns; decides which values are shortened at all
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligibilitySpec {
    patterns: Vec<KeyPattern>,
}

impl EligibilitySpec {
    #[must_use]
    pub const fn new(patterns: Vec<KeyPattern>) -> Self {
        Self { patterns }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn patterns(&self) -> &[KeyPattern] {
        &self.patterns
    }

    /// The root (empty path) is never eligible.
    #[must_use]
    pub fn is_eligible(&self, key_path: &[Key]) -> bool {
        !key_path.is_empty() && self.patterns.iter().any(|p| p.matches(key_path))
    }
}

impl From<Vec<KeyPattern>> for EligibilitySpec {
    fn from(patterns: Vec<KeyPattern>) -> Self {
        Self::new(patterns)
    }
}
