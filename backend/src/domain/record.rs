//! Shared persistence envelope carried by every stored entity.
//!
//! Entities are plain value types (`User`, `MenuItem`, ...). Once persisted they
//! are wrapped in [`Persisted`], which adds the store-assigned identifier,
//! timestamps, free-form metadata, and the unified [`DeletionState`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Opaque identifier assigned by the store at creation time.
///
/// # Examples
/// ```
/// use food_backend::domain::EntityId;
///
/// let id: EntityId = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().expect("uuid");
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Soft-delete marker shared by every entity.
///
/// Storage adapters translate from whichever column scheme the table uses:
/// an `is_active` flag or a nullable `deleted_at` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    Active,
    Deleted { at: DateTime<Utc> },
}

impl DeletionState {
    /// Translate an `is_active` column. A deactivated row reports its last
    /// update as the deletion time.
    #[must_use]
    pub fn from_active_flag(is_active: bool, updated_at: DateTime<Utc>) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Deleted { at: updated_at }
        }
    }

    /// Translate a nullable `deleted_at` column.
    #[must_use]
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        deleted_at.map_or(Self::Active, |at| Self::Deleted { at })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(*at),
        }
    }
}

/// Store-owned fields common to every persisted entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordHeader {
    pub id: EntityId,
    pub meta: Option<Value>,
    pub deletion: DeletionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordHeader {
    /// Header for a freshly created, active record.
    #[must_use]
    pub fn created(id: EntityId, meta: Option<Value>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            meta,
            deletion: DeletionState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deletion.is_active()
    }
}

/// Compute the `updated_at` stamp for a mutation.
///
/// Postgres stores microsecond precision, so successive updates are pushed at
/// least one microsecond apart even when the clock has not advanced.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use food_backend::domain::next_update_timestamp;
///
/// let previous = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
/// let next = next_update_timestamp(previous, previous);
/// assert_eq!(next, previous + Duration::microseconds(1));
/// ```
#[must_use]
pub fn next_update_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now > floor { now } else { floor }
}

/// An entity together with its [`RecordHeader`].
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<T> {
    pub header: RecordHeader,
    pub data: T,
}

impl<T> Persisted<T> {
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.header.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.header.is_active()
    }
}

impl<T> std::ops::Deref for Persisted<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Selection shared by every entity filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterScope {
    /// Restrict to one identifier.
    pub id: Option<EntityId>,
    /// Bypass the active-only default. Reserved for id-targeted lookups on
    /// the delete path; never exposed through query strings.
    pub include_deleted: bool,
}

impl FilterScope {
    /// Whether a header passes the id and deletion constraints.
    #[must_use]
    pub fn admits(&self, header: &RecordHeader) -> bool {
        (self.include_deleted || header.is_active())
            && self.id.is_none_or(|id| id == header.id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for record envelope helpers.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(seconds: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, seconds)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case(true, DeletionState::Active)]
    #[case(false, DeletionState::Deleted { at: at(5) })]
    fn active_flag_translation(#[case] flag: bool, #[case] expected: DeletionState) {
        assert_eq!(DeletionState::from_active_flag(flag, at(5)), expected);
    }

    #[rstest]
    fn deleted_at_translation_round_trips() {
        let state = DeletionState::from_deleted_at(Some(at(7)));
        assert!(!state.is_active());
        assert_eq!(state.deleted_at(), Some(at(7)));
        assert!(DeletionState::from_deleted_at(None).is_active());
    }

    #[rstest]
    fn next_update_prefers_clock_when_it_moved_forward() {
        assert_eq!(next_update_timestamp(at(1), at(9)), at(9));
    }

    #[rstest]
    fn next_update_strictly_increases_when_clock_stalls() {
        let first = next_update_timestamp(at(3), at(3));
        let second = next_update_timestamp(first, at(3));
        assert!(first > at(3));
        assert!(second > first);
    }

    #[rstest]
    fn scope_hides_deleted_records_unless_requested() {
        let mut header = RecordHeader::created(EntityId::random(), None, at(0));
        header.deletion = DeletionState::Deleted { at: at(1) };

        assert!(!FilterScope::default().admits(&header));
        let bypass = FilterScope {
            id: Some(header.id),
            include_deleted: true,
        };
        assert!(bypass.admits(&header));
    }

    #[rstest]
    fn entity_id_parses_with_surrounding_whitespace() {
        let id: EntityId = " 3fa85f64-5717-4562-b3fc-2c963f66afa6 ".parse().expect("uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }
}
