//! Cache key derivation.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Composed keys longer than this (in characters) are replaced by a digest.
pub const MAX_KEY_LENGTH: usize = 250;

// == Key Args ==
/// Positional and named parts of a cache key.
///
/// Named parts are kept sorted by name, so the order they are added in
/// never changes the derived key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyArgs {
    parts: Vec<String>,
    named: BTreeMap<String, String>,
}

impl KeyArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional part.
    pub fn part(mut self, value: impl Display) -> Self {
        self.parts.push(value.to_string());
        self
    }

    /// Sets a named part, replacing any earlier value for the same name.
    pub fn named(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.named.insert(name.into(), value.to_string());
        self
    }
}

// == Generate Key ==
/// Derives `prefix:part1:part2:name:value...`.
///
/// When that exceeds [`MAX_KEY_LENGTH`] the result is
/// `prefix:hash:<md5 of the full composed key>`.
pub fn generate_key(prefix: &str, args: &KeyArgs) -> String {
    let mut segments: Vec<&str> = Vec::with_capacity(1 + args.parts.len() + 2 * args.named.len());
    segments.push(prefix);
    segments.extend(args.parts.iter().map(String::as_str));
    for (name, value) in &args.named {
        segments.push(name);
        segments.push(value);
    }

    let key = segments.join(":");
    if key.chars().count() > MAX_KEY_LENGTH {
        format!("{prefix}:hash:{:x}", md5::compute(key.as_bytes()))
    } else {
        key
    }
}
