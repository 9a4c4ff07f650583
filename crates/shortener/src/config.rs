use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::eligibility::KeyPattern;
use crate::error::{Result, ShortenerError};
use crate::kind::StructuralKind;

/// Per-kind size limits plus the recursion depth budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeLimits {
    /// Maximum recursion depth (>= 1); composites found at this depth are dropped
    pub level: usize,

    /// Maximum entries kept in a mapping
    #[serde(alias = "dict")]
    pub mapping: usize,

    pub list: usize,

    pub tuple: usize,

    #[serde(alias = "namedtuple")]
    pub named_tuple: usize,

    pub set: usize,

    #[serde(alias = "frozenset")]
    pub frozen_set: usize,

    pub array: usize,

    pub deque: usize,

    /// Maximum characters of a string, counting its quote delimiters
    #[serde(alias = "str")]
    pub string: usize,

    /// Maximum characters in the text form of a number
    #[serde(alias = "long")]
    pub number: usize,

    /// Maximum characters rendered for opaque values
    pub other: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            level: 6,
            mapping: 4,
            list: 6,
            tuple: 6,
            named_tuple: 6,
            set: 6,
            frozen_set: 6,
            array: 5,
            deque: 6,
            string: 30,
            number: 40,
            other: 30,
        }
    }
}

impl SizeLimits {
    /// Limits used for captured locals and request payloads in error reports
    #[must_use]
    pub const fn for_locals() -> Self {
        Self {
            level: 5,
            mapping: 10,
            list: 10,
            tuple: 10,
            named_tuple: 10,
            set: 10,
            frozen_set: 10,
            array: 10,
            deque: 10,
            string: 100,
            number: 40,
            other: 100,
        }
    }

    #[must_use]
    pub const fn max_size_for(&self, kind: StructuralKind) -> usize {
        match kind {
            StructuralKind::String => self.string,
            StructuralKind::Mapping => self.mapping,
            StructuralKind::Tuple => self.tuple,
            StructuralKind::NamedTuple => self.named_tuple,
            StructuralKind::List => self.list,
            StructuralKind::Set => self.set,
            StructuralKind::FrozenSet => self.frozen_set,
            StructuralKind::Array => self.array,
            StructuralKind::Deque => self.deque,
            StructuralKind::Number => self.number,
            StructuralKind::Other => self.other,
        }
    }

    #[must_use]
    pub const fn max_level(&self) -> usize {
        self.level
    }

    pub fn set(&mut self, kind: StructuralKind, size: usize) {
        let slot = match kind {
            StructuralKind::String => &mut self.string,
            StructuralKind::Mapping => &mut self.mapping,
            StructuralKind::Tuple => &mut self.tuple,
            StructuralKind::NamedTuple => &mut self.named_tuple,
            StructuralKind::List => &mut self.list,
            StructuralKind::Set => &mut self.set,
            StructuralKind::FrozenSet => &mut self.frozen_set,
            StructuralKind::Array => &mut self.array,
            StructuralKind::Deque => &mut self.deque,
            StructuralKind::Number => &mut self.number,
            StructuralKind::Other => &mut self.other,
        };
        *slot = size;
    }

    /// Builder: set one kind's limit
    #[must_use]
    pub fn with(mut self, kind: StructuralKind, size: usize) -> Self {
        self.set(kind, size);
        self
    }

    /// Builder: set the depth budget
    #[must_use]
    pub const fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Apply an override by name (`"list"`, `"dict"`, `"level"`, ...)
    pub fn apply_override(&mut self, name: &str, size: usize) -> Result<()> {
        if name.trim().eq_ignore_ascii_case("level") {
            self.level = size;
            return Ok(());
        }
        let kind: StructuralKind = name.parse()?;
        self.set(kind, size);
        Ok(())
    }

    pub fn apply_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a str, usize)>,
    ) -> Result<()> {
        for (name, size) in overrides {
            self.apply_override(name, size)?;
        }
        Ok(())
    }

    /// Validate limits
    pub fn validate(&self) -> Result<()> {
        if self.level == 0 {
            return Err(ShortenerError::invalid_config("level must be >= 1"));
        }
        Ok(())
    }
}

/// Everything needed to build a [`crate::ShortenerTransform`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShortenerConfig {
    /// Key paths whose values are shortened; empty means nothing is
    pub keys: Vec<KeyPattern>,

    pub sizes: SizeLimits,

    /// Coerce opaque values to text before bounding them
    pub safe_repr: bool,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            sizes: SizeLimits::default(),
            safe_repr: true,
        }
    }
}

impl ShortenerConfig {
    /// Request bodies of an error report, bounded with the locals limits
    #[must_use]
    pub fn for_report_payload() -> Self {
        let keys = [
            ["request", "POST"].as_slice(),
            ["request", "json"].as_slice(),
            ["body", "request", "POST"].as_slice(),
            ["body", "request", "json"].as_slice(),
        ]
        .into_iter()
        .map(KeyPattern::literal)
        .collect();

        Self {
            keys,
            sizes: SizeLimits::for_locals(),
            safe_repr: true,
        }
    }

    /// Parse a JSON or TOML config payload
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes)
                    .map_err(|err| ShortenerError::ConfigParse(format!("{json_err}; {err}")))?;
                let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                    ShortenerError::ConfigParse(format!(
                        "config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    ))
                })?;
                serde_json::to_value(toml_value)?
            }
        };

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    pub fn validate(&self) -> Result<()> {
        self.sizes.validate()
    }
}
