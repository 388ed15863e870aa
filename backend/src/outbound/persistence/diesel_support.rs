//! Helpers shared by the Diesel entity repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::EntityKind;
use crate::domain::ports::RepositoryError;

/// `GREATEST(now, updated_at + 1µs)` for the row being updated, so that
/// `updated_at` strictly increases even when the clock stalls.
///
/// Expands to a `Timestamptz` SQL expression; call `.nullable()` on it for
/// nullable columns.
macro_rules! next_stamp {
    ($now:expr) => {
        ::diesel::dsl::sql::<::diesel::sql_types::Timestamptz>("GREATEST(")
            .bind::<::diesel::sql_types::Timestamptz, _>($now)
            .sql(", updated_at + interval '1 microsecond')")
    };
}

pub(crate) use next_stamp;

/// Map Diesel failures onto the repository port's error variants.
pub(crate) fn map_diesel_error(error: DieselError) -> RepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection closed")
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::NotNullViolation,
            info,
        ) => RepositoryError::constraint(info.message().to_owned()),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        _ => RepositoryError::query("database error"),
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside a `LIKE`
/// pattern, then wrap it for substring matching. Postgres uses `\` as the
/// default `LIKE` escape character.
pub(crate) fn substring_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// A stored row that no longer satisfies the domain types.
pub(crate) fn corrupt_row(
    kind: EntityKind,
    id: uuid::Uuid,
    reason: impl std::fmt::Display,
) -> RepositoryError {
    RepositoryError::query(format!("stored {} {id} is invalid: {reason}", kind.label()))
}
