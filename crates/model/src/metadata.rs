use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata, mirroring the property set the wrapper can apply.
///
/// `created` and `modified` default to the construction time so a freshly
/// built workbook always carries plausible timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub creator: Option<String>,
    pub last_modified_by: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub manager: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            creator: None,
            last_modified_by: None,
            created: now,
            modified: now,
            title: None,
            description: None,
            subject: None,
            keywords: None,
            category: None,
            company: None,
            manager: None,
        }
    }
}

/// Workbook security flags.
///
/// Passwords are stored as given; hashing is a per-format concern handled by
/// the writers that support protection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Security {
    pub lock_revision: bool,
    pub lock_structure: bool,
    pub lock_windows: bool,
    pub revisions_password: Option<String>,
    pub workbook_password: Option<String>,
}

impl Security {
    /// True when any protection flag or password is set.
    pub fn any_protection(&self) -> bool {
        self.lock_revision
            || self.lock_structure
            || self.lock_windows
            || self.revisions_password.is_some()
            || self.workbook_password.is_some()
    }
}
