//! Entity serialization.
//!
//! An [`EntitySerDe`] turns entities into bytes and back. Codecs are looked up
//! by format name through a [`SerDeRegistry`] built at startup.
//!
//! # Formats
//!
//! - `proto` ([`ProtoEntitySerDe`]) - protobuf wire format, the default
//! - `rkyv` ([`ArchiveEntitySerDe`]) - rkyv archives for local caches
//!
//! Both formats keep absent optional fields absent, keep empty and absent
//! property maps apart, produce identical bytes for identical entities, and
//! reject bytes of the wrong kind or of an unknown schema version.

mod archive;
mod proto;
mod registry;

pub use archive::ArchiveEntitySerDe;
pub use proto::ProtoEntitySerDe;
pub use registry::SerDeRegistry;

use crate::error::{Error, Result};
use crate::meta::{Entity, EntityKind, TypedEntity};
use std::collections::BTreeMap;

/// Serialize/deserialize contract for entities.
///
/// Implementations hold no per-call state and may be shared across threads.
pub trait EntitySerDe: Send + Sync {
    /// Format identifier this codec is registered under.
    fn format(&self) -> &'static str;

    /// Encode an entity. Returns an error, never partial bytes, if the
    /// entity cannot be encoded.
    fn serialize(&self, entity: &Entity) -> Result<Vec<u8>>;

    /// Decode bytes that must hold an entity of kind `expected`.
    fn deserialize(&self, bytes: &[u8], expected: EntityKind) -> Result<Entity>;
}

/// Typed helpers available on every [`EntitySerDe`].
pub trait EntitySerDeExt: EntitySerDe {
    /// Encode a concrete entity.
    fn serialize_entity<T: TypedEntity>(&self, entity: &T) -> Result<Vec<u8>> {
        self.serialize(&entity.clone().into())
    }

    /// Decode bytes into a concrete entity type.
    fn deserialize_entity<T: TypedEntity>(&self, bytes: &[u8]) -> Result<T> {
        T::from_entity(self.deserialize(bytes, T::KIND)?)
    }
}

impl<S: EntitySerDe + ?Sized> EntitySerDeExt for S {}

/// Turn a builder validation failure into a decode failure.
///
/// Decoders rebuild entities through the public builders, so a record that
/// lost a required field surfaces as a deserialization error.
pub(crate) fn rebuilt<T>(kind: EntityKind, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        Error::Validation { field, .. } => {
            Error::deserialization(kind, format!("missing required field `{}`", field))
        }
        other => other,
    })
}

/// Collect decoded key/value pairs, rejecting duplicate keys.
pub(crate) fn collect_properties(
    kind: EntityKind,
    entries: impl IntoIterator<Item = (String, String)>,
) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        if map.contains_key(&key) {
            return Err(Error::deserialization(
                kind,
                format!("duplicate property key `{}`", key),
            ));
        }
        map.insert(key, value);
    }
    Ok(map)
}

pub(crate) fn check_kind(expected: EntityKind, actual: EntityKind) -> Result<()> {
    if expected != actual {
        return Err(Error::KindMismatch { expected, actual });
    }
    Ok(())
}
