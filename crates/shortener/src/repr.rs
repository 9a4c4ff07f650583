use std::fmt::Write as _;

use crate::config::SizeLimits;
use crate::value::{Key, Opaque, Value};

/// Marker inserted where content was dropped
pub const ELLIPSIS: &str = "...";

/// Rendered when a value's textual form cannot be produced
pub const UNPRINTABLE: &str = "<unprintable object>";

/// Keep the head and tail of `text` so the result fits `max_len` chars.
///
/// The split gives the tail the extra char: `(max_len - 3) / 2` head chars,
/// the rest from the tail.
#[must_use]
pub fn truncate_middle(text: &str, max_len: usize) -> String {
    let count = text.chars().count();
    if count <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let left = keep / 2;
    let right = keep - left;
    splice(text, count, left, right)
}

/// [`truncate_middle`] for strings whose `max_len` also pays for the two
/// quote delimiters of the display form. The quotes themselves are not
/// emitted, so a limit of 100 keeps 47 head and 48 tail chars.
#[must_use]
pub fn truncate_quoted(text: &str, max_len: usize) -> String {
    let count = text.chars().count();
    if count <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let left = (keep / 2).saturating_sub(1);
    let right = (keep - keep / 2).saturating_sub(1);
    splice(text, count, left, right)
}

fn splice(text: &str, count: usize, left: usize, right: usize) -> String {
    let mut out = String::with_capacity(left + right + ELLIPSIS.len());
    out.extend(text.chars().take(left));
    out.push_str(ELLIPSIS);
    out.extend(text.chars().skip(count.saturating_sub(right)));
    out
}

pub(crate) fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub(crate) fn quote_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(char::from(quote));
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..=0x7e => out.push(char::from(b)),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(char::from(quote));
    out
}

enum Label<'v> {
    Plain,
    Key(&'v Key),
    Field(&'v str),
}

struct Brackets<'b> {
    open: &'b str,
    close: &'b str,
    /// Single-element tuples render as `(1,)`
    trailing_comma: bool,
}

impl<'b> Brackets<'b> {
    const fn new(open: &'b str, close: &'b str) -> Self {
        Self {
            open,
            close,
            trailing_comma: false,
        }
    }
}

/// Bounded literal-syntax rendering.
///
/// Every element is rendered through the same limits, and nesting deeper than
/// `level` collapses to `[...]`.
pub struct Repr<'a> {
    limits: &'a SizeLimits,
}

impl<'a> Repr<'a> {
    #[must_use]
    pub const fn new(limits: &'a SizeLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, self.limits.level);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, level: usize) {
        let limits = self.limits;
        match value {
            Value::None => out.push_str("None"),
            Value::Bool(b) => out.push_str(bool_text(*b)),
            Value::Number(n) => out.push_str(&truncate_middle(n.as_str(), limits.number)),
            Value::Str(s) => out.push_str(&truncate_middle(&quote_str(s), limits.string)),
            Value::Bytes(b) => out.push_str(&truncate_middle(&quote_bytes(b), limits.string)),
            Value::Mapping(map) => self.write_entries(
                out,
                map.iter().map(|(k, v)| (Label::Key(k), v)),
                map.len(),
                level,
                limits.mapping,
                &Brackets::new("{", "}"),
            ),
            Value::List(items) => self.write_entries(
                out,
                plain(items.iter()),
                items.len(),
                level,
                limits.list,
                &Brackets::new("[", "]"),
            ),
            Value::Tuple(items) => self.write_entries(
                out,
                plain(items.iter()),
                items.len(),
                level,
                limits.tuple,
                &Brackets {
                    trailing_comma: true,
                    ..Brackets::new("(", ")")
                },
            ),
            Value::NamedTuple(nt) => {
                let open = format!("{}(", nt.name);
                self.write_entries(
                    out,
                    nt.fields.iter().map(|(f, v)| (Label::Field(f), v)),
                    nt.fields.len(),
                    level,
                    limits.named_tuple,
                    &Brackets::new(&open, ")"),
                );
            }
            Value::Set(items) if items.is_empty() => out.push_str("set()"),
            Value::Set(items) => self.write_entries(
                out,
                plain(items.iter()),
                items.len(),
                level,
                limits.set,
                &Brackets::new("{", "}"),
            ),
            Value::FrozenSet(items) if items.is_empty() => out.push_str("frozenset()"),
            Value::FrozenSet(items) => self.write_entries(
                out,
                plain(items.iter()),
                items.len(),
                level,
                limits.frozen_set,
                &Brackets::new("frozenset({", "})"),
            ),
            Value::Array(array) if array.items.is_empty() => {
                let _ = write!(out, "array('{}')", array.typecode);
            }
            Value::Array(array) => {
                let open = format!("array('{}', [", array.typecode);
                self.write_entries(
                    out,
                    plain(array.items.iter()),
                    array.items.len(),
                    level,
                    limits.array,
                    &Brackets::new(&open, "])"),
                );
            }
            Value::Deque(items) => self.write_entries(
                out,
                plain(items.iter()),
                items.len(),
                level,
                limits.deque,
                &Brackets::new("deque([", "])"),
            ),
            Value::Opaque(opaque) => out.push_str(&render_opaque(opaque, limits.other, false)),
        }
    }

    fn write_entries<'v>(
        &self,
        out: &mut String,
        entries: impl Iterator<Item = (Label<'v>, &'v Value)>,
        len: usize,
        level: usize,
        max_items: usize,
        brackets: &Brackets<'_>,
    ) {
        out.push_str(brackets.open);
        if level == 0 && len > 0 {
            out.push_str(ELLIPSIS);
            out.push_str(brackets.close);
            return;
        }

        let next = level.saturating_sub(1);
        for (idx, (label, value)) in entries.take(max_items).enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            match label {
                Label::Plain => {}
                Label::Key(Key::Int(n)) => {
                    let _ = write!(out, "{n}: ");
                }
                Label::Key(Key::Str(s)) => {
                    out.push_str(&truncate_middle(&quote_str(s), self.limits.string));
                    out.push_str(": ");
                }
                Label::Field(field) => {
                    out.push_str(field);
                    out.push('=');
                }
            }
            self.write_value(out, value, next);
        }
        if len > max_items {
            if max_items > 0 {
                out.push_str(", ");
            }
            out.push_str(ELLIPSIS);
        }
        if len == 1 && brackets.trailing_comma {
            out.push(',');
        }
        out.push_str(brackets.close);
    }
}

fn plain<'v>(items: impl Iterator<Item = &'v Value>) -> impl Iterator<Item = (Label<'v>, &'v Value)> {
    items.map(|item| (Label::Plain, item))
}

pub(crate) const fn bool_text(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn render_opaque(opaque: &Opaque, max_len: usize, safe_mode: bool) -> String {
    let text = if safe_mode {
        opaque.to_text()
    } else {
        opaque.debug_text()
    };
    match text {
        Ok(text) if safe_mode => truncate_quoted(&text, max_len),
        Ok(text) => truncate_middle(&text, max_len),
        Err(_) => {
            log::warn!(
                "Failed to render {} value; using placeholder",
                opaque.type_name()
            );
            truncate_middle(UNPRINTABLE, max_len)
        }
    }
}

/// Bounded text for a value the shortener does not look inside.
///
/// `None` is propagated as `None`. In safe mode the value is first coerced to
/// text and bounded like a string; otherwise its debug representation is
/// bounded directly. Both are limited by the smaller of the `other` and
/// `string` sizes, so the text is stable when shortened again as a string.
#[must_use]
pub fn render_other(value: &Value, limits: &SizeLimits, safe_mode: bool) -> Option<String> {
    let max_len = limits.other.min(limits.string);
    match value {
        Value::None => None,
        Value::Opaque(opaque) => Some(render_opaque(opaque, max_len, safe_mode)),
        other => {
            let text = Repr::new(limits).render(other);
            Some(if safe_mode {
                truncate_quoted(&text, max_len)
            } else {
                truncate_middle(&text, max_len)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::StructuralKind;
    use pretty_assertions::assert_eq;
    use std::fmt;

    fn locals() -> SizeLimits {
        SizeLimits::for_locals()
    }

    #[test]
    fn middle_split_favours_tail() {
        let digits = "17955682733916468498414734863645002504519623752387";
        assert_eq!(
            truncate_middle(digits, 40),
            "179556827339164684...5002504519623752387"
        );
        assert_eq!(truncate_middle("abcdef", 6), "abcdef");
        assert_eq!(truncate_middle("abcdefgh", 7), "ab...gh");
    }

    #[test]
    fn quoted_split_reserves_delimiters() {
        let text = "x".repeat(120);
        let expected = format!("{}...{}", "x".repeat(47), "x".repeat(48));
        assert_eq!(truncate_quoted(&text, 100), expected);
        assert_eq!(truncate_quoted(&"x".repeat(100), 100), "x".repeat(100));
    }

    #[test]
    fn tiny_limits_never_panic() {
        for limit in 0..6 {
            let out = truncate_middle("abcdefghij", limit);
            assert!(out.contains(ELLIPSIS), "{limit}: {out}");
            let out = truncate_quoted("abcdefghij", limit);
            assert!(out.contains(ELLIPSIS), "{limit}: {out}");
        }
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(truncate_middle(&text, 7), "éé...éé");
    }

    #[test]
    fn sequences_render_with_marker() {
        let limits = locals();
        let repr = Repr::new(&limits);
        assert_eq!(
            repr.render(&Value::list(1..=11)),
            "[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...]"
        );
        assert_eq!(
            repr.render(&Value::tuple(1..=11)),
            "(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...)"
        );
        assert_eq!(
            repr.render(&Value::set(1..=11)),
            "{1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...}"
        );
        assert_eq!(
            repr.render(&Value::frozen_set(1..=11)),
            "frozenset({1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...})"
        );
        assert_eq!(
            repr.render(&Value::array('l', 1..=11)),
            "array('l', [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...])"
        );
        assert_eq!(
            repr.render(&Value::deque(1..=11)),
            "deque([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...])"
        );
    }

    #[test]
    fn empty_and_single_forms() {
        let limits = locals();
        let repr = Repr::new(&limits);
        assert_eq!(repr.render(&Value::set(Vec::<i32>::new())), "set()");
        assert_eq!(repr.render(&Value::frozen_set(Vec::<i32>::new())), "frozenset()");
        assert_eq!(repr.render(&Value::array('d', Vec::<i32>::new())), "array('d')");
        assert_eq!(repr.render(&Value::tuple([7])), "(7,)");
        assert_eq!(repr.render(&Value::list(Vec::<i32>::new())), "[]");
        assert_eq!(repr.render(&Value::mapping(Vec::<(i32, i32)>::new())), "{}");
    }

    #[test]
    fn mappings_and_named_tuples() {
        let limits = locals().with(StructuralKind::Mapping, 2);
        let repr = Repr::new(&limits);
        let map = Value::mapping([
            (Key::from("a"), Value::from(1)),
            (Key::from(2), Value::Bool(false)),
            (Key::from("c"), Value::None),
        ]);
        assert_eq!(repr.render(&map), "{'a': 1, 2: False, ...}");

        let point = Value::named_tuple("Point", [("x", 1.5), ("y", -2.0)]);
        assert_eq!(repr.render(&point), "Point(x=1.5, y=-2.0)");
    }

    #[test]
    fn nesting_collapses_past_level() {
        let limits = locals().with_level(2);
        let repr = Repr::new(&limits);
        let nested = Value::list([Value::list([Value::list([1])])]);
        assert_eq!(repr.render(&nested), "[[[...]]]");
        let empty_inner = Value::list([Value::list([Value::list(Vec::<i32>::new())])]);
        assert_eq!(repr.render(&empty_inner), "[[[]]]");
    }

    #[test]
    fn elements_are_bounded_too() {
        let limits = locals().with(StructuralKind::String, 10);
        let repr = Repr::new(&limits);
        let value = Value::list(["abcdefghijklmnop"]);
        assert_eq!(repr.render(&value), "['ab...nop']");
    }

    #[test]
    fn strings_and_bytes_are_quoted() {
        assert_eq!(quote_str("it's"), "\"it's\"");
        assert_eq!(quote_str("a\n'b\""), "'a\\n\\'b\"'");
        assert_eq!(quote_str("\u{1}"), "'\\x01'");
        assert_eq!(quote_bytes(b"ok\xff"), "b'ok\\xff'");
        assert_eq!(quote_bytes(b"'"), "b\"'\"");
    }

    #[derive(Debug)]
    struct Widget;

    impl crate::value::OpaqueValue for Widget {
        fn type_name(&self) -> &str {
            "Widget"
        }

        fn to_text(&self) -> Result<String, fmt::Error> {
            Ok("widget #1".to_string())
        }
    }

    struct Broken;

    impl fmt::Debug for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    impl crate::value::OpaqueValue for Broken {
        fn type_name(&self) -> &str {
            "Broken"
        }

        fn to_text(&self) -> Result<String, fmt::Error> {
            Err(fmt::Error)
        }
    }

    #[test]
    fn other_values_render_bounded() {
        let limits = locals();
        assert_eq!(render_other(&Value::None, &limits, true), None);
        assert_eq!(
            render_other(&Value::opaque(Widget), &limits, true).as_deref(),
            Some("widget #1")
        );
        assert_eq!(
            render_other(&Value::opaque(Widget), &limits, false).as_deref(),
            Some("Widget")
        );

        let tight = limits.with(StructuralKind::Other, 8);
        assert_eq!(
            render_other(&Value::opaque(Widget), &tight, true).as_deref(),
            Some("w...#1")
        );
    }

    #[test]
    fn other_text_also_fits_string_limit() {
        let limits = locals().with(StructuralKind::String, 7);
        assert_eq!(
            render_other(&Value::opaque(Widget), &limits, true).as_deref(),
            Some("w...1")
        );
        assert_eq!(
            render_other(&Value::opaque(Broken), &limits, true).as_deref(),
            Some("<u...t>")
        );
    }

    #[test]
    fn failing_formatters_use_placeholder() {
        let limits = locals();
        for safe in [true, false] {
            assert_eq!(
                render_other(&Value::opaque(Broken), &limits, safe).as_deref(),
                Some(UNPRINTABLE)
            );
        }
        let repr = Repr::new(&limits);
        assert_eq!(
            repr.render(&Value::list([Value::opaque(Broken)])),
            format!("[{UNPRINTABLE}]")
        );
    }
}
