use crate::{DomainError, JoinColumn, Relation, RelationConfig, TableRef};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Field {
    Scalar(ScalarField),
    Object(ObjectField),
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Scalar(sf) => &sf.name,
            Field::Object(of) => &of.name,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarField> {
        match self {
            Field::Scalar(sf) => Some(sf),
            Field::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectField> {
        match self {
            Field::Object(of) => Some(of),
            Field::Scalar(_) => None,
        }
    }
}

impl From<ScalarField> for Field {
    fn from(sf: ScalarField) -> Self {
        Field::Scalar(sf)
    }
}

impl From<ObjectField> for Field {
    fn from(of: ObjectField) -> Self {
        Field::Object(of)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ScalarType {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    Json,
    Geometry,
}

impl ScalarType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A field stored in a single column of the entity's table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarField {
    pub name: String,
    pub column: String,
    #[serde(rename = "type")]
    pub type_identifier: ScalarType,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub geometry: Option<GeometryInfo>,
}

impl ScalarField {
    pub fn new(name: impl Into<String>, column: impl Into<String>, type_identifier: ScalarType) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            type_identifier,
            is_list: false,
            geometry: None,
        }
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryInfo) -> Self {
        self.type_identifier = ScalarType::Geometry;
        self.geometry = Some(geometry);
        self
    }
}

/// Spatial metadata of a geometry column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryInfo {
    /// The SRID the column is stored in.
    pub srid: i32,
    /// Present when the geometry is also stored split into tiles.
    #[serde(default)]
    pub segments: Option<GeometrySegments>,
}

/// Large geometries stored pre-split along a fixed tile grid.
///
/// Each row of the segments table holds the part of one geometry that falls into one tile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometrySegments {
    pub table: TableRef,
    /// Columns of the segments table referencing the owning row.
    pub join_columns: Vec<JoinColumn>,
    pub tile_column: String,
    pub geometry_column: String,
    pub tiles: TileGrid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileGrid {
    pub table: TableRef,
    pub id_column: String,
    pub geometry_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectFieldKind {
    /// The target's columns live in the owning table.
    Embedded,
    /// The target lives in its own table.
    Related(Relation),
}

/// A field pointing at another entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ObjectFieldConfig")]
pub struct ObjectField {
    pub name: String,
    pub target: String,
    pub is_list: bool,
    pub kind: ObjectFieldKind,
}

impl ObjectField {
    pub fn related(name: impl Into<String>, target: impl Into<String>, relation: Relation) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            is_list: false,
            kind: ObjectFieldKind::Related(relation),
        }
    }

    pub fn embedded(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            is_list: false,
            kind: ObjectFieldKind::Embedded,
        }
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn relation(&self) -> Option<&Relation> {
        match &self.kind {
            ObjectFieldKind::Related(relation) => Some(relation),
            ObjectFieldKind::Embedded => None,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, ObjectFieldKind::Embedded)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectFieldConfig {
    name: String,
    target: String,
    #[serde(default)]
    is_list: bool,
    #[serde(default)]
    embedded: bool,
    #[serde(default)]
    relation: Option<RelationConfig>,
}

impl TryFrom<ObjectFieldConfig> for ObjectField {
    type Error = DomainError;

    fn try_from(config: ObjectFieldConfig) -> crate::Result<Self> {
        let kind = match (config.embedded, config.relation) {
            (true, None) => ObjectFieldKind::Embedded,
            (false, Some(relation)) => ObjectFieldKind::Related(Relation::try_from(relation).map_err(|err| {
                DomainError::InvalidRelation {
                    field: config.name.clone(),
                    reason: err.to_string(),
                }
            })?),
            (true, Some(_)) => {
                return Err(DomainError::InvalidRelation {
                    field: config.name,
                    reason: "an embedded field cannot declare a relation".into(),
                });
            }
            (false, None) => {
                return Err(DomainError::InvalidRelation {
                    field: config.name,
                    reason: "a relation must declare exactly one of joinColumns, joinTable or mappedBy".into(),
                });
            }
        };

        Ok(Self {
            name: config.name,
            target: config.target,
            is_list: config.is_list,
            kind,
        })
    }
}
