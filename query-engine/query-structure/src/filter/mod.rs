mod compare;
mod path;

pub use compare::*;
pub use path::*;

use crate::QueryValue;
use serde_json::{Map, Value};
use std::fmt;

/// A typed filter expression over the fields of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals {
        path: FieldPath,
        value: QueryValue,
    },
    GreaterThan {
        path: FieldPath,
        value: QueryValue,
        inclusive: bool,
    },
    LowerThan {
        path: FieldPath,
        value: QueryValue,
        inclusive: bool,
    },
    In {
        path: FieldPath,
        values: Vec<QueryValue>,
    },
    Not(Box<Filter>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Spatial(SpatialFilter),
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// The path the filter applies to, for leaf filters.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Filter::Equals { path, .. }
            | Filter::GreaterThan { path, .. }
            | Filter::LowerThan { path, .. }
            | Filter::In { path, .. } => Some(path),
            Filter::Spatial(spatial) => Some(&spatial.path),
            Filter::Not(_) | Filter::And(_) | Filter::Or(_) => None,
        }
    }

    /// Returns the same filter applied one hop deeper, with the first segment of its path removed.
    pub fn strip_first_hop(&self) -> Option<Filter> {
        let filter = match self {
            Filter::Equals { path, value } => Filter::Equals {
                path: path.tail()?,
                value: value.clone(),
            },
            Filter::GreaterThan { path, value, inclusive } => Filter::GreaterThan {
                path: path.tail()?,
                value: value.clone(),
                inclusive: *inclusive,
            },
            Filter::LowerThan { path, value, inclusive } => Filter::LowerThan {
                path: path.tail()?,
                value: value.clone(),
                inclusive: *inclusive,
            },
            Filter::In { path, values } => Filter::In {
                path: path.tail()?,
                values: values.clone(),
            },
            Filter::Spatial(spatial) => Filter::Spatial(SpatialFilter {
                path: spatial.path.tail()?,
                ..spatial.clone()
            }),
            Filter::Not(_) | Filter::And(_) | Filter::Or(_) => return None,
        };

        Some(filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialOperator {
    Contains,
    Within,
    Intersects,
    Touches,
    /// Matches on the spatial reference system only.
    Srid,
    /// Matches on the geometry type only.
    Type,
}

impl fmt::Display for SpatialOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A geometry literal as provided by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryInput {
    Wkt(String),
    GeoJson(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFilter {
    pub path: FieldPath,
    pub operator: SpatialOperator,
    pub geometry: Option<GeometryInput>,
    /// SRID of the literal, when it is not the column's.
    pub srid: Option<i32>,
}
