//! Member names derived from interface declarations.
//!
//! A property `value` is implemented by `getValue`/`setValue`; an event
//! `changed` by `onChanged`/`unChanged`.

use facet_ir::{Name, StringInterner};

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn prefixed(interner: &StringInterner, prefix: &str, name: Name) -> Name {
    let base = interner.lookup(name);
    interner.intern_owned(format!("{prefix}{}", capitalize(base)))
}

/// `getX` for property `x`.
pub fn getter_name(interner: &StringInterner, property: Name) -> Name {
    prefixed(interner, "get", property)
}

/// `setX` for property `x`.
pub fn setter_name(interner: &StringInterner, property: Name) -> Name {
    prefixed(interner, "set", property)
}

/// `onX` for event `x`.
pub fn subscribe_name(interner: &StringInterner, event: Name) -> Name {
    prefixed(interner, "on", event)
}

/// `unX` for event `x`.
pub fn unsubscribe_name(interner: &StringInterner, event: Name) -> Name {
    prefixed(interner, "un", event)
}
