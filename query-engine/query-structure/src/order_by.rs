use crate::DomainError;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(DomainError::UnsupportedSortDirection(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortCriteria {
    pub field: String,
    pub direction: SortDirection,
}

impl SortCriteria {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses a direction given as text, e.g. `"DESC"`.
    pub fn parse(field: impl Into<String>, direction: &str) -> crate::Result<Self> {
        Ok(Self {
            field: field.into(),
            direction: direction.parse()?,
        })
    }
}
