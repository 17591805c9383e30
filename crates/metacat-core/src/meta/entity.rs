//! The closed set of entity kinds and shared entity traits.

use super::{AuditInfo, CatalogEntity, Metalake, SchemaEntity, TableEntity};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a serializable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    AuditInfo,
    Metalake,
    Catalog,
    Schema,
    Table,
}

impl EntityKind {
    /// All kinds, in containment order after `AuditInfo`.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::AuditInfo,
        EntityKind::Metalake,
        EntityKind::Catalog,
        EntityKind::Schema,
        EntityKind::Table,
    ];

    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::AuditInfo => "audit_info",
            EntityKind::Metalake => "metalake",
            EntityKind::Catalog => "catalog",
            EntityKind::Schema => "schema",
            EntityKind::Table => "table",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any entity that can pass through an [`EntitySerDe`](crate::codec::EntitySerDe).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Entity {
    AuditInfo(AuditInfo),
    Metalake(Metalake),
    Catalog(CatalogEntity),
    Schema(SchemaEntity),
    Table(TableEntity),
}

impl Entity {
    /// Runtime kind of the wrapped entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::AuditInfo(_) => EntityKind::AuditInfo,
            Entity::Metalake(_) => EntityKind::Metalake,
            Entity::Catalog(_) => EntityKind::Catalog,
            Entity::Schema(_) => EntityKind::Schema,
            Entity::Table(_) => EntityKind::Table,
        }
    }
}

/// An entity with a numeric id and a name.
pub trait HasIdentifier {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
}

/// An entity that may carry provenance.
pub trait Auditable {
    fn audit_info(&self) -> Option<&AuditInfo>;
}

/// An entity that may carry a property map.
pub trait HasProperties {
    fn properties(&self) -> Option<&BTreeMap<String, String>>;

    /// Look up a single property.
    fn property(&self, key: &str) -> Option<&str> {
        self.properties()
            .and_then(|props| props.get(key))
            .map(String::as_str)
    }
}

/// A concrete entity type with a statically known kind.
pub trait TypedEntity: Clone + Into<Entity> + Sized {
    const KIND: EntityKind;

    /// Unwrap an [`Entity`] of this kind.
    fn from_entity(entity: Entity) -> Result<Self>;
}

macro_rules! typed_entity {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Entity {
            fn from(value: $ty) -> Self {
                Entity::$variant(value)
            }
        }

        impl TypedEntity for $ty {
            const KIND: EntityKind = EntityKind::$variant;

            fn from_entity(entity: Entity) -> Result<Self> {
                match entity {
                    Entity::$variant(value) => Ok(value),
                    other => Err(Error::KindMismatch {
                        expected: Self::KIND,
                        actual: other.kind(),
                    }),
                }
            }
        }
    };
}

typed_entity!(AuditInfo, AuditInfo);
typed_entity!(Metalake, Metalake);
typed_entity!(CatalogEntity, Catalog);
typed_entity!(SchemaEntity, Schema);
typed_entity!(TableEntity, Table);

macro_rules! identified_entity {
    ($($ty:ty),+) => {
        $(
            impl HasIdentifier for $ty {
                fn id(&self) -> u64 {
                    self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }

            impl Auditable for $ty {
                fn audit_info(&self) -> Option<&AuditInfo> {
                    self.audit_info.as_ref()
                }
            }

            impl HasProperties for $ty {
                fn properties(&self) -> Option<&BTreeMap<String, String>> {
                    self.properties.as_ref()
                }
            }
        )+
    };
}

identified_entity!(Metalake, CatalogEntity, SchemaEntity, TableEntity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = EntityKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["audit_info", "metalake", "catalog", "schema", "table"]);
    }

    #[test]
    fn test_from_entity_rejects_other_kind() {
        let entity: Entity = AuditInfo::new().with_creator("alice").into();
        assert_eq!(entity.kind(), EntityKind::AuditInfo);

        let err = SchemaEntity::from_entity(entity).unwrap_err();
        assert!(matches!(
            err,
            Error::KindMismatch {
                expected: EntityKind::Schema,
                actual: EntityKind::AuditInfo
            }
        ));
    }
}
