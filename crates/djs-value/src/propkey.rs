//! Property keys.

use std::rc::Rc;

/// A normalized property name. Every JS property key is, at bottom, a
/// string — arrays special-case keys that parse as a non-negative integer
/// to index into their sequential items instead of the property pool.
///
/// `Rc<str>` keeps cloning a key (common when threading a `ValueRef`
/// through the VM) cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropKey(Rc<str>);

impl PropKey {
    /// Wrap an owned string as a property key.
    pub fn new(s: impl Into<Rc<str>>) -> Self {
        Self(s.into())
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// If this key is a canonical non-negative integer written without
    /// leading zeros (`"0"`, `"1"`, `"42"`, but not `"01"` or `"-1"`),
    /// return it as an array index.
    pub fn as_index(&self) -> Option<u32> {
        let s = self.0.as_ref();
        if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
            return None;
        }
        let n: u32 = s.parse().ok()?;
        if n.to_string() == s { Some(n) } else { None }
    }

    /// The reserved `"length"` key every array/string/function exposes.
    pub fn length() -> Self {
        Self::new("length")
    }
}

impl From<&str> for PropKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PropKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<u32> for PropKey {
    fn from(i: u32) -> Self {
        Self::new(i.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_canonical_indices() {
        assert_eq!(PropKey::new("0").as_index(), Some(0));
        assert_eq!(PropKey::new("42").as_index(), Some(42));
        assert_eq!(PropKey::new("01").as_index(), None);
        assert_eq!(PropKey::new("-1").as_index(), None);
        assert_eq!(PropKey::new("x").as_index(), None);
        assert_eq!(PropKey::new("").as_index(), None);
    }
}
