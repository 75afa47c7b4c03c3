//! Per-field error accumulator shared by binders and validators.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Default limit of recorded errors for one [`ModelStateDictionary`]
pub const DEFAULT_MAX_MODEL_ERRORS: usize = 200;

const MAX_ERRORS_REACHED: &str = "The maximum number of allowed model errors has been reached.";

/// A single binding or validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    message: String,
}

impl ModelError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self { message: message.to_string() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors recorded for one field key.
#[derive(Debug, Clone, Default)]
pub struct ModelState {
    errors: Vec<ModelError>,
}

impl ModelState {
    pub fn errors(&self) -> &[ModelError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Field key to [`ModelState`] map, keyed by model name paths such as
/// `employee` or `employee.name`.
///
/// At most `max_allowed_errors - 1` regular errors are kept; the last slot
/// is taken by a single marker error under the empty key once the limit is
/// hit, and every later error is dropped.
#[derive(Debug, Clone)]
pub struct ModelStateDictionary {
    entries: BTreeMap<String, ModelState>,
    max_allowed_errors: usize,
    error_count: usize,
    max_errors_reached: bool,
}

impl Default for ModelStateDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStateDictionary {
    pub fn new() -> Self {
        Self::with_max_allowed_errors(DEFAULT_MAX_MODEL_ERRORS)
    }

    pub fn with_max_allowed_errors(max_allowed_errors: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_allowed_errors: max_allowed_errors.max(1),
            error_count: 0,
            max_errors_reached: false,
        }
    }

    #[inline]
    pub fn max_allowed_errors(&self) -> usize {
        self.max_allowed_errors
    }

    /// Records `message` under `key`.
    ///
    /// Returns false if the error was dropped because the limit has been
    /// reached. Binder errors such as the unsupported content type one are
    /// dropped the same way, only the empty-key marker remains.
    pub fn add_model_error<K: Into<String>, S: ToString>(&mut self, key: K, message: S) -> bool {
        if self.error_count >= self.max_allowed_errors - 1 {
            self.record_max_errors_reached();
            return false;
        }

        self.push_error(key.into(), ModelError::new(message));
        true
    }

    fn record_max_errors_reached(&mut self) {
        if self.max_errors_reached {
            return;
        }
        self.max_errors_reached = true;
        self.push_error(String::new(), ModelError::new(MAX_ERRORS_REACHED));
    }

    fn push_error(&mut self, key: String, error: ModelError) {
        self.entries.entry(key).or_default().errors.push(error);
        self.error_count += 1;
    }

    #[inline]
    pub fn has_reached_max_errors(&self) -> bool {
        self.max_errors_reached
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&ModelState> {
        self.entries.get(key)
    }

    /// Returns the total number of recorded errors, the limit marker included
    #[inline]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Returns true if neither `key` nor any of its sub keys (`key.field`,
    /// `key[0]`) has an error.
    pub fn is_valid_field(&self, key: &str) -> bool {
        self.entries
            .iter()
            .filter(|(entry_key, _)| is_same_or_sub_key(key, entry_key))
            .all(|(_, state)| state.is_valid())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ModelState> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, ModelState> {
        self.entries.keys()
    }

    /// Copies every error of `other` into this dictionary, honoring this
    /// dictionary's limit.
    pub fn merge(&mut self, other: &ModelStateDictionary) {
        for (key, state) in other.iter() {
            for error in state.errors() {
                self.add_model_error(key.as_str(), error.message());
            }
        }
    }
}

impl<'a> IntoIterator for &'a ModelStateDictionary {
    type Item = (&'a String, &'a ModelState);
    type IntoIter = btree_map::Iter<'a, String, ModelState>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `employee` covers `employee`, `employee.name` and `employee[0]`, the
/// empty prefix covers everything.
pub(crate) fn is_same_or_sub_key(prefix: &str, key: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

/// Joins a model name and a property path the way keys are recorded.
pub(crate) fn join_key(prefix: &str, field: &str) -> String {
    match (prefix.is_empty(), field.is_empty()) {
        (true, _) => field.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) if field.starts_with('[') => format!("{prefix}{field}"),
        (false, false) => format!("{prefix}.{field}"),
    }
}
