//! Entity-model revision tags.

use serde::Serialize;
use std::fmt;

/// Revision of the entity model that produced a record.
///
/// The tag is written into every metalake record so that a decoder can pick
/// field-compatibility rules by revision. Decoders reject tags they do not
/// know instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SchemaVersion {
    #[serde(rename = "0.1")]
    V0_1,
}

impl SchemaVersion {
    /// The revision written by this build.
    pub const CURRENT: SchemaVersion = SchemaVersion::V0_1;

    pub fn major(&self) -> u32 {
        match self {
            SchemaVersion::V0_1 => 0,
        }
    }

    pub fn minor(&self) -> u32 {
        match self {
            SchemaVersion::V0_1 => 1,
        }
    }

    /// Look up a revision by its numeric parts.
    pub fn from_parts(major: u32, minor: u32) -> Option<Self> {
        match (major, minor) {
            (0, 1) => Some(SchemaVersion::V0_1),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_roundtrip() {
        let v = SchemaVersion::CURRENT;
        assert_eq!(SchemaVersion::from_parts(v.major(), v.minor()), Some(v));
        assert_eq!(v.to_string(), "0.1");
    }

    #[test]
    fn test_unknown_parts() {
        assert_eq!(SchemaVersion::from_parts(0, 0), None);
        assert_eq!(SchemaVersion::from_parts(1, 1), None);
    }
}
