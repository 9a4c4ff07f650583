//! Property-based tests for the shortener
//!
//! Random payloads and limits check that shortened output always respects the
//! configured bounds and that values outside eligible key paths are untouched.

use payload_shortener::{
    classify, KeyPattern, OpaqueValue, Shortener, ShortenerConfig, ShortenerTransform,
    SizeLimits, StructuralKind, Value,
};
use proptest::prelude::*;

/// Host object whose text form is the wrapped string
#[derive(Debug)]
struct Handle(String);

impl OpaqueValue for Handle {
    fn type_name(&self) -> &str {
        "Handle"
    }

    fn to_text(&self) -> Result<String, std::fmt::Error> {
        Ok(self.0.clone())
    }
}

// Generators for test data

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[0-9]{20,60}".prop_map(|digits| Value::number(&digits).unwrap()),
        "[a-z ]{0,40}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..40).prop_map(Value::Bytes),
        "[a-z<> ]{0,80}".prop_map(|text| Value::opaque(Handle(text))),
    ]
}

/// Nested payloads built from every container kind
fn payload() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(5, 96, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Tuple),
            prop::collection::vec(inner.clone(), 0..8).prop_map(|items| Value::set(items)),
            prop::collection::vec(inner.clone(), 0..8).prop_map(|items| Value::frozen_set(items)),
            prop::collection::vec(inner.clone(), 0..8).prop_map(|items| Value::deque(items)),
            prop::collection::vec(inner.clone(), 0..8).prop_map(|items| Value::array('l', items)),
            prop::collection::vec(("[a-z]{1,6}", inner.clone()), 0..8)
                .prop_map(|fields| Value::named_tuple("Record", fields)),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..8).prop_map(|entries| Value::mapping(entries)),
        ]
    })
}

fn size_limits() -> impl Strategy<Value = SizeLimits> {
    (
        (1usize..5, 0usize..6, 0usize..6),
        (3usize..40, 1usize..50, 0usize..50),
    )
        .prop_map(|((level, mapping, seq), (string, number, other))| {
            let mut limits = SizeLimits::for_locals()
                .with_level(level)
                .with(StructuralKind::Mapping, mapping)
                .with(StructuralKind::String, string)
                .with(StructuralKind::Number, number)
                .with(StructuralKind::Other, other);
            for kind in StructuralKind::ALL {
                if kind.is_composite() && kind != StructuralKind::Mapping {
                    limits.set(kind, seq);
                }
            }
            limits
        })
}

fn children(value: &Value) -> Vec<&Value> {
    match value {
        Value::Mapping(map) => map.values().collect(),
        Value::List(items) | Value::Tuple(items) | Value::Set(items) | Value::FrozenSet(items) => {
            items.iter().collect()
        }
        Value::NamedTuple(nt) => nt.fields.iter().map(|(_, v)| v).collect(),
        Value::Array(array) => array.items.iter().collect(),
        Value::Deque(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// Collect every composite that is too large or sits too deep.
fn bound_violations(value: &Value, limits: &SizeLimits, depth: usize, out: &mut Vec<String>) {
    if let Some(len) = value.element_count() {
        let kind = classify(value);
        if len > limits.max_size_for(kind) {
            out.push(format!("{kind} with {len} elements at depth {depth}"));
        }
        if depth >= limits.level {
            out.push(format!("{kind} at depth {depth} (level {})", limits.level));
        }
    }
    for child in children(value) {
        bound_violations(child, limits, depth + 1, out);
    }
}

proptest! {
    /// Property: no composite in the output exceeds its kind's limit or the depth budget
    #[test]
    fn prop_output_respects_bounds(value in payload(), limits in size_limits()) {
        let shortener = Shortener::new(limits, true).unwrap();
        let out = shortener.shortened(value);

        let mut violations = Vec::new();
        bound_violations(&out, &limits, 0, &mut violations);
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }

    /// Property: shortening an already-shortened payload changes nothing
    #[test]
    fn prop_shortening_is_idempotent(
        value in payload(),
        limits in size_limits(),
        safe_repr in any::<bool>(),
    ) {
        let shortener = Shortener::new(limits, safe_repr).unwrap();
        let once = shortener.shortened(value);
        let twice = shortener.shortened(once.clone());
        prop_assert_eq!(twice, once);
    }

    /// Property: shortened strings never exceed the string limit
    #[test]
    fn prop_strings_fit_limit(
        items in prop::collection::vec("[a-z]{0,120}", 0..6),
        limit in 3usize..60,
    ) {
        let limits = SizeLimits::for_locals().with(StructuralKind::String, limit);
        let shortener = Shortener::new(limits, true).unwrap();
        let out = shortener.shortened(Value::list(items.clone()));

        let shortened = children(&out);
        prop_assert_eq!(shortened.len(), items.len());
        for (before, after) in items.iter().zip(shortened) {
            let text = after.as_str().unwrap();
            prop_assert!(text.chars().count() <= limit, "{} -> {}", before, text);
            if before.chars().count() <= limit {
                prop_assert_eq!(text, before.as_str());
            } else {
                prop_assert!(text.contains("..."));
            }
        }
    }

    /// Property: values outside eligible key paths are left exactly as they were
    #[test]
    fn prop_ineligible_values_untouched(target in payload(), other in payload()) {
        let transform = ShortenerTransform::new(ShortenerConfig {
            keys: vec![KeyPattern::parse("target").unwrap()],
            sizes: SizeLimits::default(),
            safe_repr: true,
        })
        .unwrap();

        let mut data = Value::mapping([("target", target), ("other", other.clone())]);
        transform.apply(&mut data);
        prop_assert_eq!(data.get(&"other".into()), Some(&other));
    }

    /// Property: without configured keys the payload is never modified
    #[test]
    fn prop_no_keys_no_changes(value in payload()) {
        let transform = ShortenerTransform::new(ShortenerConfig::default()).unwrap();
        let mut data = value.clone();
        transform.apply(&mut data);
        prop_assert_eq!(data, value);
    }
}
