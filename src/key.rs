//! Instance keys.

use std::fmt::{self, Display, Formatter};

/// Uniquely identifies a live element instance. Written to the host node as
/// the `data-key` attribute.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Key(String);

impl Key {
    /// The key as it appears in the `data-key` attribute.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> From<&'a str> for Key {
    fn from(string: &'a str) -> Key {
        Key(string.to_string())
    }
}

impl From<String> for Key {
    fn from(string: String) -> Key {
        Key(string)
    }
}

/// Hands out keys from a monotonic counter, so two instances created by the
/// same generator can never collide.
#[derive(Debug)]
pub struct KeyGenerator {
    prefix: String,
    next: u64,
}

impl KeyGenerator {
    /// Create a generator whose keys all start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> KeyGenerator {
        KeyGenerator {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Produce the next key.
    pub fn next_key(&mut self) -> Key {
        let id = self.next;
        self.next += 1;
        Key(format!("{}{}", self.prefix, to_base36(id)))
    }

    /// Number of keys handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
