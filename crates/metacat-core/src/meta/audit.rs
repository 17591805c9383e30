//! Creation and modification provenance.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who created or last modified an entity, and when.
///
/// Every field is independently optional. An unset field is never the same
/// as an empty string or the Unix epoch, and codecs preserve the difference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AuditInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) last_modifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) last_modified_time: Option<DateTime<Utc>>,
}

impl AuditInfo {
    /// Create an audit info with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Audit info for an entity created now by `creator`.
    pub fn created_by(creator: impl Into<String>) -> Self {
        Self::new().with_creator(creator).with_create_time(Utc::now())
    }

    /// Set the creator.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Set the creation time.
    pub fn with_create_time(mut self, time: DateTime<Utc>) -> Self {
        self.create_time = Some(time);
        self
    }

    /// Set the last modifier.
    pub fn with_last_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.last_modifier = Some(modifier.into());
        self
    }

    /// Set the last modification time.
    pub fn with_last_modified_time(mut self, time: DateTime<Utc>) -> Self {
        self.last_modified_time = Some(time);
        self
    }

    /// Copy of this audit info recording a modification at `time`.
    ///
    /// Creator and creation time are kept.
    pub fn modified(&self, modifier: Option<&str>, time: DateTime<Utc>) -> Self {
        Self {
            last_modifier: modifier.map(str::to_string).or_else(|| self.last_modifier.clone()),
            last_modified_time: Some(time),
            ..self.clone()
        }
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.create_time
    }

    pub fn last_modifier(&self) -> Option<&str> {
        self.last_modifier.as_deref()
    }

    pub fn last_modified_time(&self) -> Option<DateTime<Utc>> {
        self.last_modified_time
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.creator.is_none()
            && self.create_time.is_none()
            && self.last_modifier.is_none()
            && self.last_modified_time.is_none()
    }
}

/// Normalize an audit info attached to an entity.
///
/// An audit info with no fields set carries no provenance, so entities store
/// it as absent. This keeps a single "no audit" state in memory and on the
/// wire.
pub(crate) fn normalize(audit: Option<AuditInfo>) -> Option<AuditInfo> {
    audit.filter(|a| !a.is_empty())
}
