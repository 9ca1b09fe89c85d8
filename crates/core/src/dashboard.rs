//! Versioned dashboard documents.
//!
//! A [`DashboardDocument`] pairs typed metadata (identity, version, ownership,
//! timestamps) with the open JSON payload clients edit. The payload is kept
//! verbatim; only `title`, `id`, `version`, `gnetId`, `ownerUserId`,
//! `isPrivate` and `tags` are read from it.
//!
//! Lifecycle, as seen through [`SaveState`]:
//!
//! ```text
//! Unsaved (version absent) --first save--> Created (version 0, created_by set)
//!                          --next save---> Updated (version N > 0)
//! ```
//!
//! The document never increments its own version; persistence does.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DashboardError, OwnershipMismatch};
use crate::slug::generate_slug;
use crate::types::{DbId, Timestamp};

/// Open payload of a dashboard (panels, rows, templating, ...).
pub type Payload = Map<String, Value>;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Where a dashboard is served from; the prefix of its playback URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    File,
    Db,
    Script,
    Snapshot,
}

impl DashboardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Db => "db",
            Self::Script => "script",
            Self::Snapshot => "snapshot",
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The canonical, versioned dashboard entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDocument {
    /// Assigned by persistence on first save.
    pub id: Option<DbId>,
    pub org_id: DbId,
    /// Id of the dashboard on the public dashboard gallery, `0` if none.
    pub gnet_id: DbId,
    pub owner_user_id: DbId,
    /// Empty unless the dashboard was installed by a plugin.
    pub plugin_id: String,
    pub title: String,
    /// Always `generate_slug(title)`.
    pub slug: String,
    /// `None` until the document has been saved once.
    pub version: Option<i32>,
    pub is_private: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub payload: Payload,
}

/// Where a document sits in its save lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Unsaved,
    Created,
    Updated(i32),
}

impl DashboardDocument {
    fn empty(payload: Payload) -> Self {
        Self {
            id: None,
            org_id: 0,
            gnet_id: 0,
            owner_user_id: 0,
            plugin_id: String::new(),
            title: String::new(),
            slug: String::new(),
            version: None,
            is_private: false,
            created_by: None,
            updated_by: None,
            created_at: None,
            updated_at: None,
            payload,
        }
    }

    /// A brand-new, unsaved dashboard with only a title.
    pub fn from_title(title: &str) -> Self {
        let now = Utc::now();
        let mut payload = Payload::new();
        payload.insert("title".into(), Value::String(title.to_string()));

        let mut dash = Self::empty(payload);
        dash.title = title.to_string();
        dash.created_at = Some(now);
        dash.updated_at = Some(now);
        dash.update_slug();
        dash
    }

    /// Build a document from an incoming payload.
    ///
    /// A numeric `id` marks an existing dashboard; without one the payload is
    /// treated as new and its `version` is reset to `0`.
    pub fn from_payload(payload: Payload) -> Self {
        Self::from_payload_at(payload, Utc::now())
    }

    /// [`Self::from_payload`] with an explicit clock reading.
    pub fn from_payload_at(payload: Payload, now: Timestamp) -> Self {
        let mut dash = Self::empty(payload);
        dash.title = dash.get_string("title", "");
        dash.update_slug();

        match number_field(&dash.payload, "id") {
            Some(id) => {
                dash.id = Some(id);
                if let Some(version) = number_field(&dash.payload, "version") {
                    dash.version = i32::try_from(version).ok();
                    dash.updated_at = Some(now);
                }
            }
            None => {
                dash.payload.insert("version".into(), Value::from(0));
                dash.version = Some(0);
                dash.created_at = Some(now);
                dash.updated_at = Some(now);
            }
        }

        if let Some(gnet_id) = number_field(&dash.payload, "gnetId") {
            dash.gnet_id = gnet_id;
        }

        if let Some(owner) = number_field(&dash.payload, "ownerUserId") {
            dash.owner_user_id = owner;
            if let Some(private) = dash.payload.get("isPrivate").and_then(Value::as_bool) {
                dash.is_private = private;
            }
        }

        dash
    }

    /// Turn a save command into the document that will be persisted.
    pub fn from_save_command(cmd: &SaveDashboardCommand) -> Self {
        Self::from_save_command_at(cmd, Utc::now())
    }

    /// [`Self::from_save_command`] with an explicit clock reading.
    pub fn from_save_command_at(cmd: &SaveDashboardCommand, now: Timestamp) -> Self {
        let mut dash = Self::from_payload_at(cmd.dashboard.clone(), now);

        // A missing payload version counts as a first save.
        if number_field(&dash.payload, "version").unwrap_or(0) == 0 {
            dash.created_by = Some(cmd.user_id);
        }

        dash.updated_by = Some(cmd.user_id);
        dash.org_id = cmd.org_id;
        dash.plugin_id = cmd.plugin_id.clone();
        dash.owner_user_id = cmd.user_id;
        dash.is_private = cmd.is_private;
        dash.update_slug();
        dash
    }

    /// Change the title, keeping the payload and slug in step.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.payload
            .insert("title".into(), Value::String(title.to_string()));
        self.update_slug();
    }

    /// Recompute the slug from the current title.
    pub fn update_slug(&mut self) {
        self.slug = generate_slug(&self.title);
    }

    /// Record the identity persistence assigned, mirroring it into the payload
    /// so clients send it back on their next save.
    pub fn stamp_saved(&mut self, id: DbId, version: i32) {
        self.id = Some(id);
        self.version = Some(version);
        self.payload.insert("id".into(), Value::from(id));
        self.payload.insert("version".into(), Value::from(version));
    }

    pub fn save_state(&self) -> SaveState {
        match self.version {
            None => SaveState::Unsaved,
            Some(0) => SaveState::Created,
            Some(n) => SaveState::Updated(n),
        }
    }

    /// The `tags` array of the payload. Non-string entries are skipped.
    pub fn tags(&self) -> Vec<String> {
        self.payload
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A string field of the payload, or `default` when absent or not a string.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Playback URI of this dashboard.
    pub fn uri(&self) -> String {
        format!("{}/{}", DashboardKind::Db.as_str(), self.slug)
    }
}

/// Read a numeric payload field. Integers and whole floats are accepted.
fn number_field(payload: &Payload, key: &str) -> Option<i64> {
    let value = payload.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

// ---------------------------------------------------------------------------
// Commands and projections
// ---------------------------------------------------------------------------

/// Request to create or update a dashboard.
///
/// `org_id`, `plugin_id` and `user_id` are filled in by the server from the
/// caller's identity, never from the request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveDashboardCommand {
    pub dashboard: Payload,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(skip)]
    pub org_id: DbId,
    #[serde(skip)]
    pub plugin_id: String,
    #[serde(skip)]
    pub user_id: DbId,
}

/// The few columns the playlist resolver needs from a stored dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardHeader {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub org_id: DbId,
    pub owner_user_id: DbId,
    pub is_private: bool,
}

impl DashboardHeader {
    /// Whether a user of `org_id` may see this dashboard: same org, and not
    /// another user's private dashboard.
    pub fn visible_to(&self, org_id: DbId, user_id: DbId) -> bool {
        self.org_id == org_id && (!self.is_private || self.owner_user_id == user_id)
    }
}

/// Tag usage count within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCloudItem {
    pub term: String,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Save conflict rules
// ---------------------------------------------------------------------------

/// How persistence should write an accepted save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePlan {
    Insert,
    /// Update row `id`, expecting it to still be at `stored_version`.
    Update { id: DbId, stored_version: i32 },
}

/// Decide whether `incoming` may be written, given what is stored.
///
/// `existing_by_id` is the stored row for `incoming.id` (if the incoming
/// document has one); `existing_by_slug` is any row in the same org with the
/// incoming slug. With `overwrite`, version mismatches are ignored and a
/// same-named dashboard is replaced in place.
pub fn check_save_conflicts(
    incoming: &DashboardDocument,
    existing_by_id: Option<&DashboardDocument>,
    existing_by_slug: Option<&DashboardDocument>,
    overwrite: bool,
) -> Result<SavePlan, DashboardError> {
    let mut target = match incoming.id {
        Some(id) => {
            let existing = existing_by_id.ok_or(DashboardError::NotFound { id })?;
            let stored_version = existing.version.unwrap_or(0);
            let expected = incoming.version.unwrap_or(0);
            if !overwrite && expected != stored_version {
                return Err(DashboardError::VersionConflict {
                    expected,
                    actual: stored_version,
                });
            }
            Some(existing)
        }
        None => None,
    };

    if let Some(same_name) = existing_by_slug {
        if same_name.id != incoming.id {
            if !overwrite {
                return Err(DashboardError::SameNameExists);
            }
            target = Some(same_name);
        }
    }

    let Some(target) = target else {
        return Ok(SavePlan::Insert);
    };

    check_ownership(incoming, target)?;

    let id = target.id.ok_or(DashboardError::Validation(
        "stored dashboard has no id".into(),
    ))?;
    Ok(SavePlan::Update {
        id,
        stored_version: target.version.unwrap_or(0),
    })
}

fn check_ownership(
    incoming: &DashboardDocument,
    stored: &DashboardDocument,
) -> Result<(), OwnershipMismatch> {
    if !stored.plugin_id.is_empty() && stored.plugin_id != incoming.plugin_id {
        return Err(OwnershipMismatch::Plugin {
            plugin_id: stored.plugin_id.clone(),
        });
    }
    if stored.is_private && stored.owner_user_id != incoming.owner_user_id {
        return Err(OwnershipMismatch::User);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
