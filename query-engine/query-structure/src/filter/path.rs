use std::fmt;

/// A list of field names: zero or more object-field hops followed by the filtered field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn is_leaf(&self) -> bool {
        self.0.len() == 1
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The path without its first hop; `None` for a leaf.
    pub fn tail(&self) -> Option<FieldPath> {
        if self.is_leaf() {
            None
        } else {
            Some(FieldPath(self.0[1..].to_vec()))
        }
    }
}

impl From<&str> for FieldPath {
    /// Splits on dots: `"brewery.name"` is a two-hop path.
    fn from(path: &str) -> Self {
        FieldPath(path.split('.').map(ToOwned::to_owned).collect())
    }
}

impl From<Vec<&str>> for FieldPath {
    fn from(segments: Vec<&str>) -> Self {
        FieldPath(segments.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
