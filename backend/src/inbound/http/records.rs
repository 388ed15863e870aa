//! Response pieces shared by every entity endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{EntityKind, RecordHeader};

/// Store-owned fields serialised alongside every entity.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordFields {
    pub id: Uuid,
    pub meta: Option<Value>,
    /// `false` once the record has been soft-deleted.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&RecordHeader> for RecordFields {
    fn from(header: &RecordHeader) -> Self {
        Self {
            id: *header.id.as_uuid(),
            meta: header.meta.clone(),
            is_active: header.is_active(),
            created_at: header.created_at,
            updated_at: header.updated_at,
        }
    }
}

/// Body returned by every `DELETE` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeletionResponse {
    #[schema(example = "user deleted successfully")]
    pub message: String,
    /// Follow-up work that did not complete. Omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DeletionResponse {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            message: format!("{} deleted successfully", kind.label()),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}
