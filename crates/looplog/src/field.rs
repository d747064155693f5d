use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use crate::format::{FieldValue, Format};

/// A named log column holding the most recently set value.
///
/// `Field` is a handle: clones share the same cell, so the control loop can keep
/// one copy while a [`LogSession`](crate::LogSession) reads another. The text
/// is kept until the next `set`, which lets a row repeat a value that was not
/// updated during the current cycle.
#[derive(Debug, Clone)]
pub struct Field(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    label: String,
    format: Option<Format>,
    text: Mutex<String>,
}

impl Field {
    pub fn new(label: impl Into<String>) -> Self {
        Self::build(label.into(), None)
    }

    /// Create a field whose values use `format` unless overridden per call.
    pub fn with_format(label: impl Into<String>, format: Format) -> Self {
        Self::build(label.into(), Some(format))
    }

    fn build(label: String, format: Option<Format>) -> Self {
        Self(Arc::new(Inner {
            label,
            format,
            text: Mutex::new(String::new()),
        }))
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    #[must_use]
    pub fn format(&self) -> Option<Format> {
        self.0.format
    }

    pub fn set<V: FieldValue>(&self, value: V) {
        self.store(value.render(self.0.format));
    }

    pub fn set_with<V: FieldValue>(&self, format: Format, value: V) {
        self.store(value.render(Some(format)));
    }

    /// Current text of the field, empty until the first `set`.
    #[must_use]
    pub fn text(&self) -> String {
        self.with_text(str::to_owned)
    }

    pub(crate) fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let text = self.0.text.lock().unwrap_or_else(PoisonError::into_inner);
        f(&text)
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn store(&self, rendered: String) {
        *self.0.text.lock().unwrap_or_else(PoisonError::into_inner) = rendered;
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_text(|text| f.write_str(text))
    }
}
