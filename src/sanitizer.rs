//! Escaping of user-supplied text for embedding in XML/XUL markup
//!
//! Sanitizing never mutates its input; every call returns a cleaned copy.
//! The escaping is idempotent: text that already went through [`sanitize`]
//! comes back unchanged, so sanitizing twice never double-escapes.

use crate::models::{MetadataRecord, TargetApplication};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    // Entity references allowed to survive as-is: the escapes this module
    // emits itself. Anything else starting with `&` is literal text.
    static ref ALLOWED_ENTITY: Regex = Regex::new(r"^&(?:amp|lt|gt|quot|apos|#37);").unwrap();
}

/// Values that can be sanitized structurally.
///
/// Strings are escaped; containers are rebuilt with every contained string
/// sanitized, keeping their shape and element order.
pub trait Sanitize {
    fn sanitize(&self) -> Self;
}

/// Return a sanitized copy of `value`
pub fn sanitize<T: Sanitize>(value: &T) -> T {
    value.sanitize()
}

/// Escape markup-reserved characters and drop characters XML cannot carry.
///
/// `<`, `>`, `"`, `'` and `%` are always escaped; `%` would otherwise open a
/// parameter entity reference when the text lands in a DTD entity value.
/// `&` is escaped unless it opens one of the escapes produced here, which
/// keeps the function idempotent. Other character references are escaped
/// too: inside an entity value they would expand back into markup.
/// Control characters other than tab, newline and carriage return are
/// removed, since no XML document may contain them.
pub fn escape_markup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for (index, c) in input.char_indices() {
        match c {
            '&' => match ALLOWED_ENTITY.find(&input[index..]) {
                Some(_) => output.push('&'),
                None => output.push_str("&amp;"),
            },
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&apos;"),
            '%' => output.push_str("&#37;"),
            '\t' | '\n' | '\r' => output.push(c),
            c if c.is_control() => {}
            c => output.push(c),
        }
    }

    output
}

impl Sanitize for String {
    fn sanitize(&self) -> Self {
        escape_markup(self)
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(&self) -> Self {
        self.as_ref().map(Sanitize::sanitize)
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(&self) -> Self {
        self.iter().map(Sanitize::sanitize).collect()
    }
}

impl<T: Sanitize> Sanitize for BTreeMap<String, T> {
    fn sanitize(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.clone(), value.sanitize()))
            .collect()
    }
}

/// Free-form structures: strings, arrays and object values are sanitized,
/// numbers, booleans and null pass through.
impl Sanitize for serde_json::Value {
    fn sanitize(&self) -> Self {
        use serde_json::Value;

        match self {
            Value::String(s) => Value::String(escape_markup(s)),
            Value::Array(items) => Value::Array(items.iter().map(Sanitize::sanitize).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.sanitize()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Sanitize for TargetApplication {
    fn sanitize(&self) -> Self {
        Self {
            guid: self.guid.sanitize(),
            min_version: self.min_version.sanitize(),
            max_version: self.max_version.sanitize(),
        }
    }
}

impl Sanitize for MetadataRecord {
    fn sanitize(&self) -> Self {
        Self {
            id: self.id.sanitize(),
            version: self.version.sanitize(),
            name: self.name.sanitize(),
            description: self.description.sanitize(),
            author_name: self.author_name.sanitize(),
            contributors: self.contributors.sanitize(),
            target_applications: self.target_applications.sanitize(),
            uuid: self.uuid.clone(),
            slug: self.slug.clone(),
        }
    }
}
