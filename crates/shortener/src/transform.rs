use crate::config::ShortenerConfig;
use crate::eligibility::EligibilitySpec;
use crate::error::Result;
use crate::shortener::Shortener;
use crate::value::{Key, Value};

/// What [`walk`] does after a node has been visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into the node's children
    Descend,
    /// Leave the node's subtree alone
    Skip,
}

/// Per-node visitor driven by [`walk`]
pub trait Transform {
    fn visit(&self, value: &mut Value, key_path: &[Key]) -> Visit;
}

/// Visit every node below `root` in pre-order.
///
/// The root itself has the empty path and is not visited. Mapping children are
/// addressed by their key, sequence children by index, named-tuple fields by
/// field name.
pub fn walk(root: &mut Value, transform: &dyn Transform) {
    let mut path = Vec::new();
    walk_children(root, &mut path, transform);
}

fn walk_children(value: &mut Value, path: &mut Vec<Key>, transform: &dyn Transform) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                walk_node(child, key.clone(), path, transform);
            }
        }
        Value::List(items) | Value::Tuple(items) | Value::Set(items) | Value::FrozenSet(items) => {
            for (idx, child) in items.iter_mut().enumerate() {
                walk_node(child, Key::from(idx), path, transform);
            }
        }
        Value::NamedTuple(nt) => {
            for (field, child) in &mut nt.fields {
                walk_node(child, Key::Str(field.clone()), path, transform);
            }
        }
        Value::Array(array) => {
            for (idx, child) in array.items.iter_mut().enumerate() {
                walk_node(child, Key::from(idx), path, transform);
            }
        }
        Value::Deque(items) => {
            for (idx, child) in items.iter_mut().enumerate() {
                walk_node(child, Key::from(idx), path, transform);
            }
        }
        Value::None
        | Value::Bool(_)
        | Value::Number(_)
        | Value::Str(_)
        | Value::Bytes(_)
        | Value::Opaque(_) => {}
    }
}

fn walk_node(child: &mut Value, key: Key, path: &mut Vec<Key>, transform: &dyn Transform) {
    path.push(key);
    if transform.visit(child, path) == Visit::Descend {
        walk_children(child, path, transform);
    }
    path.pop();
}

fn display_path(key_path: &[Key]) -> String {
    key_path
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Shortens the values found at configured key paths and leaves the rest of
/// the structure alone.
///
/// ```rust
/// use payload_shortener::{Key, ShortenerConfig, ShortenerTransform, Value};
///
/// let transform = ShortenerTransform::new(ShortenerConfig::for_report_payload()).unwrap();
/// let mut payload = Value::mapping([(
///     "request",
///     Value::mapping([("POST", Value::mapping((0..12).map(|i| (i, i))))]),
/// )]);
/// transform.apply(&mut payload);
///
/// let post = payload
///     .get(&Key::from("request"))
///     .and_then(|request| request.get(&Key::from("POST")))
///     .and_then(Value::as_mapping)
///     .unwrap();
/// assert_eq!(post.len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct ShortenerTransform {
    shortener: Shortener,
    eligibility: EligibilitySpec,
}

impl ShortenerTransform {
    pub fn new(config: ShortenerConfig) -> Result<Self> {
        config.validate()?;
        let shortener = Shortener::new(config.sizes, config.safe_repr)?;
        Ok(Self {
            shortener,
            eligibility: EligibilitySpec::new(config.keys),
        })
    }

    #[must_use]
    pub const fn shortener(&self) -> &Shortener {
        &self.shortener
    }

    #[must_use]
    pub const fn eligibility(&self) -> &EligibilitySpec {
        &self.eligibility
    }

    /// By-value form of [`Transform::visit`]
    #[must_use]
    pub fn visit_value(&self, mut value: Value, key_path: &[Key]) -> Value {
        self.visit(&mut value, key_path);
        value
    }

    /// Shorten every eligible value below `root`
    pub fn apply(&self, root: &mut Value) {
        walk(root, self);
    }
}

impl Transform for ShortenerTransform {
    fn visit(&self, value: &mut Value, key_path: &[Key]) -> Visit {
        if !self.eligibility.is_eligible(key_path) {
            return Visit::Descend;
        }
        log::debug!("Shortening value at {}", display_path(key_path));
        self.shortener.shorten(value);
        Visit::Skip
    }
}
