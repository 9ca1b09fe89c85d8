use crate::types::DbId;

/// Generic domain error taxonomy, mapped to HTTP status codes by the API layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by an external collaborator behind one of the ports.
///
/// Adapters flatten their own error types (sqlx, HTTP clients, ...) into a
/// message so the core stays independent of any storage crate.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PortError(pub String);

impl PortError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

// ---------------------------------------------------------------------------
// Playlist resolution
// ---------------------------------------------------------------------------

/// Fatal errors of playlist resolution. Per-tag search failures never
/// surface here; they only drop that tag's matches.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The playlist's items could not be loaded.
    #[error("Could not load items of playlist {playlist_id}: {source}")]
    ItemsUnavailable {
        playlist_id: DbId,
        #[source]
        source: PortError,
    },

    /// The batch lookup of id references failed. No partial result is returned.
    #[error("Dashboard lookup by id failed: {0}")]
    ReferenceLookupFailed(#[source] PortError),
}

impl From<ResolveError> for CoreError {
    fn from(err: ResolveError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Dashboard documents
// ---------------------------------------------------------------------------

/// Who owns a dashboard that a save tried to modify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipMismatch {
    #[error("Dashboard belongs to plugin {plugin_id}")]
    Plugin { plugin_id: String },

    #[error("The dashboard is owned by another user")]
    User,
}

/// Errors surfaced by dashboard save/load operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Dashboard not found: {id}")]
    NotFound { id: DbId },

    #[error("The dashboard has been changed by someone else")]
    VersionConflict { expected: i32, actual: i32 },

    #[error(transparent)]
    OwnershipMismatch(#[from] OwnershipMismatch),

    #[error("A dashboard with the same name already exists")]
    SameNameExists,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Dashboard persistence failed: {0}")]
    Persistence(#[from] PortError),
}

impl From<DashboardError> for CoreError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::NotFound { id } => CoreError::NotFound {
                entity: "Dashboard",
                id,
            },
            DashboardError::VersionConflict { .. } | DashboardError::SameNameExists => {
                CoreError::Conflict(err.to_string())
            }
            DashboardError::OwnershipMismatch(_) => CoreError::Forbidden(err.to_string()),
            DashboardError::Validation(msg) => CoreError::Validation(msg),
            DashboardError::Persistence(source) => CoreError::Internal(source.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn version_conflict_maps_to_conflict() {
        let err: CoreError = DashboardError::VersionConflict {
            expected: 1,
            actual: 3,
        }
        .into();
        assert_matches!(err, CoreError::Conflict(msg) if msg.contains("changed by someone else"));
    }

    #[test]
    fn same_name_maps_to_conflict() {
        let err: CoreError = DashboardError::SameNameExists.into();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[test]
    fn plugin_ownership_maps_to_forbidden() {
        let err: CoreError = DashboardError::from(OwnershipMismatch::Plugin {
            plugin_id: "nginx-app".into(),
        })
        .into();
        assert_matches!(err, CoreError::Forbidden(msg) if msg.contains("nginx-app"));
    }

    #[test]
    fn lookup_failure_is_internal() {
        let err: CoreError =
            ResolveError::ReferenceLookupFailed(PortError::new("connection reset")).into();
        assert_matches!(err, CoreError::Internal(msg) if msg.contains("connection reset"));
    }
}
