//! Traits tying entity value types to their filters.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{EntityId, FilterScope, Persisted};

/// Every entity kind the platform stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    UserAddress,
    Restaurant,
    MenuCategory,
    MenuItem,
    File,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::UserAddress => "user_address",
            Self::Restaurant => "restaurant",
            Self::MenuCategory => "menu_category",
            Self::MenuItem => "menu_item",
            Self::File => "file",
        }
    }

    /// Human-facing label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::UserAddress => "user address",
            Self::Restaurant => "restaurant",
            Self::MenuCategory => "menu category",
            Self::MenuItem => "menu item",
            Self::File => "file",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type stored through an `EntityRepository`.
pub trait EntityData: Clone + Send + Sync + 'static {
    /// Filter accepted by `Get`.
    type Filter: RecordFilter<Self>;

    const KIND: EntityKind;

    /// Adjust fields when the record is soft-deleted.
    fn retire(&mut self) {}
}

/// Query filter for an entity type.
///
/// Field constraints are exact equality, except name fields which match by
/// substring. Adapters translating filters to SQL must agree with
/// [`RecordFilter::matches`].
pub trait RecordFilter<T>: fmt::Debug + Clone + Default + Send + Sync + 'static {
    fn scope(&self) -> &FilterScope;

    fn scope_mut(&mut self) -> &mut FilterScope;

    /// Whether the entity's own fields satisfy the filter.
    fn matches_data(&self, data: &T) -> bool;

    /// Filter selecting a single active record.
    #[must_use]
    fn by_id(id: EntityId) -> Self {
        let mut filter = Self::default();
        filter.scope_mut().id = Some(id);
        filter
    }

    /// Same filter, bypassing the active-only default.
    #[must_use]
    fn including_deleted(mut self) -> Self {
        self.scope_mut().include_deleted = true;
        self
    }

    fn matches(&self, record: &Persisted<T>) -> bool {
        self.scope().admits(&record.header) && self.matches_data(&record.data)
    }
}

/// Exact-equality helper: an unset constraint matches anything.
pub(crate) fn eq_or_any<T: PartialEq + ?Sized>(constraint: Option<&T>, value: &T) -> bool {
    constraint.is_none_or(|expected| expected == value)
}

/// Exact-equality helper for optional entity fields.
pub(crate) fn eq_optional<T: PartialEq + ?Sized>(
    constraint: Option<&T>,
    value: Option<&T>,
) -> bool {
    match constraint {
        None => true,
        Some(expected) => value == Some(expected),
    }
}

/// Substring containment used by name filters.
pub(crate) fn contains_or_any(constraint: Option<&str>, value: &str) -> bool {
    constraint.is_none_or(|needle| value.contains(needle))
}

/// Inclusive numeric range where either bound may be open.
pub(crate) fn within_bounds(min: Option<f64>, max: Option<f64>, value: f64) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}
