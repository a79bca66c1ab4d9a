//! Fixed permission catalog and per-level defaults.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::level::AdminLevel;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "approve_identity").
/// Only ids present in [`catalog`] are ever effective; unknown ids are
/// dropped during account normalization rather than rejected at read time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The complete, enumerable permission catalog.
///
/// Order is stable; additions go at the end of their section.
pub const CATALOG: [&str; 24] = [
    // Clients
    "view_clients",
    "edit_clients",
    "delete_clients",
    // Documents
    "view_documents",
    "download_documents",
    "upload_documents",
    "approve_documents",
    "reject_documents",
    "request_document_info",
    // Verification
    "view_verification",
    "approve_identity",
    "revoke_identity",
    "unlock_identity",
    "approve_business",
    // Assignments
    "view_assignments",
    "manage_assignments",
    // Operators
    "view_operators",
    "invite_operators",
    "suspend_operators",
    "manage_permissions",
    // Client teams
    "view_team",
    "manage_team",
    // Misc
    "send_notifications",
    "view_activity_log",
];

/// All catalog permissions as typed values.
pub fn catalog() -> BTreeSet<Permission> {
    CATALOG.iter().map(|id| Permission::new(*id)).collect()
}

/// Whether `id` names a catalog permission.
pub fn is_known_permission(id: &str) -> bool {
    CATALOG.contains(&id)
}

/// Default permission set for an admin level.
///
/// Deterministic and non-empty for every level; `Super` receives the full
/// catalog. These apply only when an account carries no explicit permission
/// list.
pub fn default_permissions(level: AdminLevel) -> BTreeSet<Permission> {
    let ids: &[&str] = match level {
        AdminLevel::Super => &CATALOG,
        AdminLevel::AreaAccountant => &[
            "view_clients",
            "edit_clients",
            "view_documents",
            "download_documents",
            "approve_documents",
            "reject_documents",
            "request_document_info",
            "view_verification",
            "view_assignments",
            "send_notifications",
            "view_activity_log",
        ],
        AdminLevel::CustomerService => &[
            "view_clients",
            "view_documents",
            "view_verification",
            "view_team",
            "send_notifications",
            "view_activity_log",
        ],
        AdminLevel::TechnicalSupport => &["view_clients", "view_documents", "view_activity_log"],
    };

    ids.iter().map(|id| Permission::new(*id)).collect()
}
