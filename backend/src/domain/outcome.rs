//! Results that carry advisory failures alongside a committed value.

/// A committed primary result plus non-fatal side-effect failures.
///
/// Warnings never imply the value was rolled back; they describe secondary
/// work (pointer sync, forwarding, cleanup) that did not complete.
///
/// # Examples
/// ```
/// use food_backend::domain::WithWarnings;
///
/// let mut outcome = WithWarnings::new(7);
/// outcome.warn("cleanup skipped");
/// assert_eq!(outcome.value, 7);
/// assert_eq!(outcome.warnings, vec!["cleanup skipped".to_owned()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WithWarnings<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> WithWarnings<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WithWarnings<U> {
        WithWarnings {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (T, Vec<String>) {
        (self.value, self.warnings)
    }
}
