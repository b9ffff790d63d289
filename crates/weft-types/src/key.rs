use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Ordered, non-empty sequence of string steps addressing one location in a
/// context tree.
///
/// Two keys are equal iff their step sequences are equal. Steps themselves
/// must be non-empty; the separator used by [`ContextKey::parse`] and
/// `Display` is `/` and is purely a rendering convention — it never appears
/// inside a step.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextKey(Vec<String>);

impl ContextKey {
    /// Create a key from owned steps. Rejects empty keys and empty steps.
    pub fn new(steps: Vec<String>) -> Result<Self, TypeError> {
        if steps.is_empty() {
            return Err(TypeError::EmptyKey);
        }
        if steps.iter().any(|s| s.is_empty()) {
            return Err(TypeError::EmptyStep);
        }
        Ok(Self(steps))
    }

    /// Create a key from string slices.
    pub fn from_steps<S: AsRef<str>>(steps: &[S]) -> Result<Self, TypeError> {
        Self::new(steps.iter().map(|s| s.as_ref().to_string()).collect())
    }

    /// Parse a `/`-separated key, e.g. `"data/contracts/index"`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Self::new(s.split('/').map(str::to_string).collect())
    }

    /// The ordered steps.
    pub fn steps(&self) -> &[String] {
        &self.0
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: keys are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The final step (the leaf name).
    pub fn last(&self) -> &str {
        self.0.last().expect("keys are non-empty by construction")
    }

    /// A new key with one more step appended.
    pub fn child(&self, step: impl Into<String>) -> Result<Self, TypeError> {
        let step = step.into();
        if step.is_empty() {
            return Err(TypeError::EmptyStep);
        }
        let mut steps = self.0.clone();
        steps.push(step);
        Ok(Self(steps))
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    pub fn is_prefix_of(&self, other: &ContextKey) -> bool {
        other.0.len() > self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Debug for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextKey({self})")
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl TryFrom<Vec<String>> for ContextKey {
    type Error = TypeError;

    fn try_from(steps: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_key() {
        assert!(matches!(ContextKey::new(vec![]), Err(TypeError::EmptyKey)));
    }

    #[test]
    fn new_rejects_empty_step() {
        let err = ContextKey::new(vec!["a".into(), String::new()]).unwrap_err();
        assert!(matches!(err, TypeError::EmptyStep));
    }

    #[test]
    fn equality_is_step_sequence_equality() {
        let k1 = ContextKey::from_steps(&["a", "b"]).unwrap();
        let k2 = ContextKey::parse("a/b").unwrap();
        let k3 = ContextKey::from_steps(&["a", "c"]).unwrap();
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let key = ContextKey::parse("data/contracts/index").unwrap();
        assert_eq!(key.len(), 3);
        assert_eq!(format!("{key}"), "data/contracts/index");
    }

    #[test]
    fn parse_rejects_trailing_separator() {
        assert!(ContextKey::parse("a/b/").is_err());
        assert!(ContextKey::parse("").is_err());
    }

    #[test]
    fn child_appends_step() {
        let key = ContextKey::parse("a").unwrap();
        let child = key.child("b").unwrap();
        assert_eq!(child, ContextKey::parse("a/b").unwrap());
        assert_eq!(child.last(), "b");
    }

    #[test]
    fn prefix_detection() {
        let a = ContextKey::parse("a").unwrap();
        let ab = ContextKey::parse("a/b").unwrap();
        let ac = ContextKey::parse("a/c").unwrap();
        assert!(a.is_prefix_of(&ab));
        assert!(!ab.is_prefix_of(&a));
        assert!(!ab.is_prefix_of(&ac));
        assert!(!a.is_prefix_of(&a));
    }

    #[test]
    fn serde_roundtrip() {
        let key = ContextKey::parse("a/b/c").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        let parsed: ContextKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, parsed);
    }
}
