//! Document collections holding mythology reference entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// A document collection in the reference store.
///
/// Declaration order matches [`Collection::PROBE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Deities,
    Heroes,
    Creatures,
    Places,
    Concepts,
}

impl Collection {
    /// Order in which untyped entity ids are probed.
    pub const PROBE_ORDER: [Collection; 5] = [
        Collection::Deities,
        Collection::Heroes,
        Collection::Creatures,
        Collection::Places,
        Collection::Concepts,
    ];

    /// Collections scanned when searching for archetype matches.
    pub const ARCHETYPE_SCAN: [Collection; 3] = [
        Collection::Deities,
        Collection::Heroes,
        Collection::Creatures,
    ];

    /// Table/collection name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deities => "deities",
            Self::Heroes => "heroes",
            Self::Creatures => "creatures",
            Self::Places => "places",
            Self::Concepts => "concepts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PROBE_ORDER
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StorageError::invalid_document(format!("unknown collection '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_order() {
        let names: Vec<_> = Collection::PROBE_ORDER.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["deities", "heroes", "creatures", "places", "concepts"]);
    }

    #[test]
    fn test_archetype_scan_excludes_places_and_concepts() {
        assert!(!Collection::ARCHETYPE_SCAN.contains(&Collection::Places));
        assert!(!Collection::ARCHETYPE_SCAN.contains(&Collection::Concepts));
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("Heroes".parse::<Collection>().unwrap(), Collection::Heroes);
        assert!("monsters".parse::<Collection>().is_err());

        let json = serde_json::to_string(&Collection::Creatures).unwrap();
        assert_eq!(json, "\"creatures\"");
    }
}
