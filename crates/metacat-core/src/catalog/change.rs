//! Alter descriptors for schemas and tables.

use crate::error::Result;
use crate::meta::{check_name_part, AuditInfo, SchemaEntity, TableEntity};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A single modification applied by `alter_schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
    /// Insert or overwrite a property.
    SetProperty { key: String, value: String },
    /// Remove a property. Removing a missing key is a no-op.
    RemoveProperty { key: String },
    /// Replace or clear the comment.
    UpdateComment(Option<String>),
}

impl SchemaChange {
    pub fn set_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        SchemaChange::SetProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove_property(key: impl Into<String>) -> Self {
        SchemaChange::RemoveProperty { key: key.into() }
    }

    pub fn update_comment(comment: impl Into<String>) -> Self {
        SchemaChange::UpdateComment(Some(comment.into()))
    }
}

/// A single modification applied by `alter_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChange {
    /// Rename the table within its schema.
    Rename { new_name: String },
    SetProperty { key: String, value: String },
    RemoveProperty { key: String },
    UpdateComment(Option<String>),
}

impl TableChange {
    pub fn rename(new_name: impl Into<String>) -> Self {
        TableChange::Rename {
            new_name: new_name.into(),
        }
    }

    pub fn set_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        TableChange::SetProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove_property(key: impl Into<String>) -> Self {
        TableChange::RemoveProperty { key: key.into() }
    }

    pub fn update_comment(comment: impl Into<String>) -> Self {
        TableChange::UpdateComment(Some(comment.into()))
    }
}

/// Audit info for an entity altered at `now`: creator and create time are
/// kept, last modified time is refreshed.
pub(crate) fn touched(audit: Option<&AuditInfo>, now: DateTime<Utc>) -> AuditInfo {
    audit.cloned().unwrap_or_default().modified(None, now)
}

/// Audit info for an entity created at `now`.
pub(crate) fn created(now: DateTime<Utc>) -> AuditInfo {
    AuditInfo::new().with_create_time(now)
}

fn remove_property(properties: &mut Option<BTreeMap<String, String>>, key: &str) {
    if let Some(map) = properties.as_mut() {
        map.remove(key);
    }
}

/// Apply schema changes, in order, producing the altered schema.
pub(crate) fn apply_schema_changes(
    schema: &SchemaEntity,
    changes: &[SchemaChange],
    now: DateTime<Utc>,
) -> Result<SchemaEntity> {
    let mut comment = schema.comment.clone();
    let mut properties = schema.properties.clone();

    for change in changes {
        match change {
            SchemaChange::SetProperty { key, value } => {
                properties
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key.clone(), value.clone());
            }
            SchemaChange::RemoveProperty { key } => remove_property(&mut properties, key),
            SchemaChange::UpdateComment(c) => comment = c.clone(),
        }
    }

    schema
        .to_builder()
        .with_optional_comment(comment)
        .with_optional_properties(properties)
        .with_audit_info(touched(schema.audit_info.as_ref(), now))
        .build()
}

/// Apply table changes, in order, producing the altered table.
///
/// A rename only changes the entity's name; moving its storage is up to the
/// provider.
pub(crate) fn apply_table_changes(
    table: &TableEntity,
    changes: &[TableChange],
    now: DateTime<Utc>,
) -> Result<TableEntity> {
    let mut name = table.name.clone();
    let mut comment = table.comment.clone();
    let mut properties = table.properties.clone();

    for change in changes {
        match change {
            TableChange::Rename { new_name } => {
                check_name_part(new_name)?;
                name = new_name.clone();
            }
            TableChange::SetProperty { key, value } => {
                properties
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key.clone(), value.clone());
            }
            TableChange::RemoveProperty { key } => remove_property(&mut properties, key),
            TableChange::UpdateComment(c) => comment = c.clone(),
        }
    }

    table
        .to_builder()
        .with_name(name)
        .with_optional_comment(comment)
        .with_optional_properties(properties)
        .with_audit_info(touched(table.audit_info.as_ref(), now))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_schema_changes_in_order() {
        let schema = SchemaEntity::builder()
            .with_id(1)
            .with_name("sales")
            .with_audit_info(AuditInfo::created_by("alice").with_create_time(t(100)))
            .build()
            .unwrap();

        let altered = apply_schema_changes(
            &schema,
            &[
                SchemaChange::set_property("a", "1"),
                SchemaChange::set_property("b", "2"),
                SchemaChange::remove_property("a"),
                SchemaChange::update_comment("quarterly"),
            ],
            t(200),
        )
        .unwrap();

        assert_eq!(altered.comment(), Some("quarterly"));
        assert_eq!(altered.properties().unwrap().len(), 1);
        let audit = altered.audit_info().unwrap();
        assert_eq!(audit.creator(), Some("alice"));
        assert_eq!(audit.create_time(), Some(t(100)));
        assert_eq!(audit.last_modified_time(), Some(t(200)));
    }

    #[test]
    fn test_remove_missing_property_keeps_absent() {
        let schema = SchemaEntity::builder()
            .with_id(1)
            .with_name("sales")
            .build()
            .unwrap();
        let altered =
            apply_schema_changes(&schema, &[SchemaChange::remove_property("x")], t(1)).unwrap();
        assert!(altered.properties().is_none());
    }

    #[test]
    fn test_table_rename() {
        let table = TableEntity::builder()
            .with_id(7)
            .with_name("orders")
            .build()
            .unwrap();

        let renamed =
            apply_table_changes(&table, &[TableChange::rename("orders_v2")], t(5)).unwrap();
        assert_eq!(renamed.name(), "orders_v2");
        assert_eq!(renamed.id(), 7);

        for bad in ["a.b", "a/b", ""] {
            let err = apply_table_changes(&table, &[TableChange::rename(bad)], t(5)).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
    }
}
