//! # Payload Shortener
//!
//! Bounded-size structural shortening for nested report payloads.
//!
//! ## Philosophy
//!
//! Captured payloads (request bodies, local variables) can be arbitrarily
//! large. The shortener bounds them while keeping them readable:
//! - Values at configured key paths are shortened; everything else is left alone
//! - Each value is bounded by a rule chosen from its shape, not its type name
//! - Dropped content is always marked with `...`
//! - Shortening never fails; only configuration can
//!
//! ## Architecture
//!
//! ```text
//! Payload (Value tree)
//!     │
//!     ├──> walk (pre-order, key path per node)
//!     │
//!     ├──> EligibilitySpec (exact-length key patterns)
//!     │
//!     └──> Shortener (eligible subtrees only)
//!          ├─> classify → StructuralKind
//!          ├─> SizeLimits per kind
//!          ├─> mappings: keep first entries
//!          ├─> sequences/sets: bounded literal text (Repr)
//!          ├─> strings/numbers: head + "..." + tail
//!          └─> recurse; drop composites at the depth floor
//! ```
//!
//! ## Example
//!
//! ```rust
//! use payload_shortener::{KeyPattern, ShortenerConfig, ShortenerTransform, SizeLimits, Value};
//!
//! let config = ShortenerConfig {
//!     keys: vec![KeyPattern::parse("locals").unwrap()],
//!     sizes: SizeLimits::for_locals(),
//!     ..ShortenerConfig::default()
//! };
//! let transform = ShortenerTransform::new(config).unwrap();
//!
//! let mut payload = Value::mapping([("locals", Value::list(1..=11))]);
//! transform.apply(&mut payload);
//!
//! assert_eq!(
//!     payload,
//!     Value::mapping([("locals", "[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...]")])
//! );
//! ```

mod config;
mod eligibility;
mod error;
mod kind;
mod repr;
mod shortener;
mod transform;
mod value;

pub use config::{ShortenerConfig, SizeLimits};
pub use eligibility::{EligibilitySpec, KeyPattern};
pub use error::{Result, ShortenerError};
pub use kind::{classify, StructuralKind};
pub use repr::{render_other, truncate_middle, truncate_quoted, Repr, ELLIPSIS, UNPRINTABLE};
pub use shortener::Shortener;
pub use transform::{walk, ShortenerTransform, Transform, Visit};
pub use value::{Key, Mapping, NamedTuple, Number, Opaque, OpaqueValue, TypedArray, Value};
