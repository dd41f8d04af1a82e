use serde::Deserialize;
use std::collections::HashMap;

/// Knows which spatial reference systems geometry columns are available in.
pub trait CrsRegistry: Send + Sync {
    /// Suffix of the sibling column holding the geometry pre-projected to `srid`.
    fn column_suffix(&self, srid: i32) -> Option<&str>;

    /// An SRID with the same coordinates as `srid`, differing only in its label.
    fn equivalent_srid(&self, srid: i32) -> Option<i32>;
}

/// A registry configured up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticCrsRegistry {
    suffixes: HashMap<i32, String>,
    equivalents: HashMap<i32, i32>,
}

impl StaticCrsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(mut self, srid: i32, suffix: impl Into<String>) -> Self {
        self.suffixes.insert(srid, suffix.into());
        self
    }

    /// Registers `srid` and `equivalent` as interchangeable, in both directions.
    pub fn with_equivalent(mut self, srid: i32, equivalent: i32) -> Self {
        self.equivalents.insert(srid, equivalent);
        self.equivalents.entry(equivalent).or_insert(srid);
        self
    }
}

impl CrsRegistry for StaticCrsRegistry {
    fn column_suffix(&self, srid: i32) -> Option<&str> {
        self.suffixes.get(&srid).map(String::as_str)
    }

    fn equivalent_srid(&self, srid: i32) -> Option<i32> {
        self.equivalents.get(&srid).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalents_work_both_ways() {
        let registry = StaticCrsRegistry::new().with_equivalent(3857, 900913);

        assert_eq!(registry.equivalent_srid(3857), Some(900913));
        assert_eq!(registry.equivalent_srid(900913), Some(3857));
        assert_eq!(registry.equivalent_srid(4326), None);
    }

    #[test]
    fn deserializes_from_json() {
        let registry: StaticCrsRegistry =
            serde_json::from_str(r#"{ "suffixes": { "4326": "_wgs84" }, "equivalents": { "3857": 900913 } }"#).unwrap();

        assert_eq!(registry.column_suffix(4326), Some("_wgs84"));
        assert_eq!(registry.column_suffix(28992), None);
        assert_eq!(registry.equivalent_srid(3857), Some(900913));
    }
}
