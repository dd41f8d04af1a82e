use crate::{DomainError, KeyMap};
use itertools::Itertools;

/// Key values of many parent rows, used to fetch one relation for all of them at once.
///
/// Key names are the parent-side columns of the relation.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCriteria {
    keys: Vec<KeyMap>,
}

impl JoinCriteria {
    /// Deduplicates the keys, keeping first-seen order. All keys must share the same names.
    pub fn new(keys: impl IntoIterator<Item = KeyMap>) -> crate::Result<Self> {
        let keys = keys.into_iter().unique().collect_vec();
        let first = keys.first().ok_or(DomainError::EmptyJoinCriteria)?;
        let expected = first.keys().cloned().collect_vec();

        if let Some(other) = keys.iter().find(|k| !k.keys().eq(expected.iter())) {
            return Err(DomainError::InconsistentJoinKeys {
                expected,
                found: other.keys().cloned().collect(),
            });
        }

        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[KeyMap] {
        &self.keys
    }

    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.keys[0].keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
