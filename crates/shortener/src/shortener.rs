use crate::config::SizeLimits;
use crate::error::Result;
use crate::kind::{classify, StructuralKind};
use crate::repr::{bool_text, quote_bytes, render_other, truncate_middle, truncate_quoted, Repr};
use crate::value::Value;

/// Recursive engine that shrinks a value in place to fit [`SizeLimits`].
///
/// Each node is classified and bounded by its kind's rule:
///
/// - mappings keep their first `mapping` entries;
/// - other composites over their limit become a literal string ending in `...`;
/// - strings and numbers over their limit keep head and tail around `...`;
/// - everything else is rendered as bounded text.
///
/// Text produced for a node never exceeds the `string` limit, so shortening
/// an already-shortened value changes nothing.
///
/// Composites that survive are recursed into. A composite child found at depth
/// `level` is removed from its parent instead, whatever its size. Depth 1 is
/// the root's children.
///
/// Values are owned trees, so there are no reference cycles to follow; the
/// depth budget alone bounds recursion.
#[derive(Debug, Clone)]
pub struct Shortener {
    limits: SizeLimits,
    safe_repr: bool,
}

impl Shortener {
    /// Create a shortener; fails when the limits are malformed
    pub fn new(limits: SizeLimits, safe_repr: bool) -> Result<Self> {
        limits.validate()?;
        Ok(Self { limits, safe_repr })
    }

    #[must_use]
    pub const fn limits(&self) -> &SizeLimits {
        &self.limits
    }

    #[must_use]
    pub const fn safe_repr(&self) -> bool {
        self.safe_repr
    }

    /// Shorten `value` in place
    pub fn shorten(&self, value: &mut Value) {
        self.shorten_node(value);
        self.traverse(value, 1);
    }

    /// By-value form of [`Shortener::shorten`]
    #[must_use]
    pub fn shortened(&self, mut value: Value) -> Value {
        self.shorten(&mut value);
        value
    }

    fn shorten_node(&self, value: &mut Value) {
        let kind = classify(value);
        let max_size = self.limits.max_size_for(kind);
        match kind {
            StructuralKind::Mapping => {
                if let Value::Mapping(map) = value {
                    map.truncate(max_size);
                }
            }
            StructuralKind::Tuple
            | StructuralKind::NamedTuple
            | StructuralKind::List
            | StructuralKind::Set
            | StructuralKind::FrozenSet
            | StructuralKind::Array
            | StructuralKind::Deque => {
                if value.element_count().is_some_and(|len| len > max_size) {
                    let text = Repr::new(&self.limits).render(value);
                    *value = Value::Str(truncate_middle(&text, self.limits.string));
                }
            }
            StructuralKind::String => match value {
                Value::Str(s) if s.chars().count() > max_size => {
                    *value = Value::Str(truncate_quoted(s, max_size));
                }
                Value::Bytes(bytes) if bytes.len() > max_size => {
                    *value = Value::Str(truncate_middle(&quote_bytes(bytes), max_size));
                }
                _ => {}
            },
            StructuralKind::Number => {
                let text = match value {
                    Value::Number(n) => n.as_str(),
                    Value::Bool(b) => bool_text(*b),
                    _ => return,
                };
                if text.chars().count() > max_size {
                    let max_len = max_size.min(self.limits.string);
                    *value = Value::Str(truncate_middle(text, max_len));
                }
            }
            StructuralKind::Other => {
                if let Some(text) = render_other(value, &self.limits, self.safe_repr) {
                    *value = Value::Str(text);
                }
            }
        }
    }

    fn traverse(&self, value: &mut Value, level: usize) {
        match value {
            Value::Mapping(map) => map.retain(|_, child| self.visit_child(child, level)),
            // Set elements may collide after shortening; sets are display-only by then.
            Value::List(items) | Value::Tuple(items) | Value::Set(items) | Value::FrozenSet(items) => {
                items.retain_mut(|child| self.visit_child(child, level));
            }
            Value::NamedTuple(nt) => nt
                .fields
                .retain_mut(|(_, child)| self.visit_child(child, level)),
            Value::Array(array) => array
                .items
                .retain_mut(|child| self.visit_child(child, level)),
            Value::Deque(items) => items.retain_mut(|child| self.visit_child(child, level)),
            Value::None
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Str(_)
            | Value::Bytes(_)
            | Value::Opaque(_) => {}
        }
    }

    /// Returns whether the child stays in its parent.
    fn visit_child(&self, child: &mut Value, level: usize) -> bool {
        if child.is_composite() && level >= self.limits.level {
            log::trace!(
                "Dropping {} at depth {level} (max level {})",
                classify(child),
                self.limits.level
            );
            return false;
        }
        self.shorten_node(child);
        if child.is_composite() {
            self.traverse(child, level + 1);
        }
        true
    }
}
