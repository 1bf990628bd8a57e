// File: rusty-forms-client/src/validators.rs
// Purpose: Regex validators keyed by field type or field name

use crate::error::FormError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

// Built-in patterns. Caller overrides replace these on key collision.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("built-in email pattern"));

static TEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.[+]*[(]{0,1}[0-9]{1,4}[)]{0,1}[-\s\./0-9]*$").expect("built-in tel pattern")
});

static PASSWORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.{8,32}$").expect("built-in password pattern"));

/// Mapping from a key (input type or field name) to a pattern
///
/// Lookups never fail: a missing key means "no constraint".
#[derive(Debug, Clone)]
pub struct ValidatorSet {
    patterns: HashMap<String, Regex>,
}

impl ValidatorSet {
    /// Built-in validators only: `email`, `tel`, `password`
    pub fn builtin() -> Self {
        let mut patterns = HashMap::new();
        patterns.insert("email".to_string(), EMAIL_REGEX.clone());
        patterns.insert("tel".to_string(), TEL_REGEX.clone());
        patterns.insert("password".to_string(), PASSWORD_REGEX.clone());
        Self { patterns }
    }

    /// An empty set with no constraints at all
    pub fn empty() -> Self {
        Self {
            patterns: HashMap::new(),
        }
    }

    /// Built-ins merged with caller patterns given as regex sources
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, FormError> {
        let mut set = Self::builtin();
        for (key, source) in overrides {
            let regex = Regex::new(source).map_err(|source| FormError::InvalidPattern {
                key: key.clone(),
                source,
            })?;
            set.insert(key.clone(), regex);
        }
        Ok(set)
    }

    /// Add or replace a validator
    pub fn insert(&mut self, key: impl Into<String>, pattern: Regex) {
        self.patterns.insert(key.into(), pattern);
    }

    /// Validator registered for an input type (`email`, `tel`, ...)
    pub fn for_type(&self, kind: Option<&str>) -> Option<&Regex> {
        kind.and_then(|k| self.patterns.get(k))
    }

    /// Validator registered for a field name
    pub fn for_name(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.patterns.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ValidatorSet {
    fn default() -> Self {
        Self::builtin()
    }
}
