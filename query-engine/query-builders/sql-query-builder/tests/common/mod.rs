#![allow(dead_code)]

use indoc::indoc;
use query_builder::{CompiledBatch, CompiledSelect};
use query_structure::{BatchRequest, CollectionRequest, ObjectRequest, Schema};
use sql_query_builder::{CompilerSettings, ParamMode, Postgres, SqlError, SqlQueryBuilder, StaticCrsRegistry};

pub const SCHEMA: &str = indoc! {r#"
    [
      {
        "name": "Beer",
        "table": "beer",
        "keyFields": ["identifier"],
        "fields": [
          { "kind": "scalar", "name": "identifier", "column": "id", "type": "Int" },
          { "kind": "scalar", "name": "name", "column": "name", "type": "String" },
          { "kind": "scalar", "name": "abv", "column": "abv", "type": "Float" },
          { "kind": "scalar", "name": "soldPerYear", "column": "sold_per_year", "type": "Int" },
          { "kind": "scalar", "name": "tags", "column": "tags", "type": "String", "isList": true },
          {
            "kind": "object",
            "name": "brewery",
            "target": "Brewery",
            "relation": { "joinColumns": [{ "name": "brewery_id", "referencedField": "identifier" }] }
          },
          {
            "kind": "object",
            "name": "label",
            "target": "Label",
            "relation": { "joinColumns": [{ "name": "label_id", "referencedColumn": "id" }] }
          },
          {
            "kind": "object",
            "name": "ingredients",
            "target": "Ingredient",
            "isList": true,
            "relation": {
              "joinTable": {
                "table": "beer_ingredient",
                "joinColumns": [{ "name": "beer_id", "referencedField": "identifier" }],
                "inverseJoinColumns": [{ "name": "ingredient_code", "referencedColumn": "code" }]
              }
            }
          }
        ]
      },
      {
        "name": "Brewery",
        "table": "brewery",
        "keyFields": ["identifier"],
        "fields": [
          { "kind": "scalar", "name": "identifier", "column": "id", "type": "Int" },
          { "kind": "scalar", "name": "name", "column": "name", "type": "String" },
          { "kind": "object", "name": "address", "target": "Address", "embedded": true },
          {
            "kind": "scalar",
            "name": "geometry",
            "column": "geometry",
            "type": "Geometry",
            "geometry": { "srid": 28992 }
          },
          {
            "kind": "scalar",
            "name": "area",
            "column": "area",
            "type": "Geometry",
            "geometry": {
              "srid": 28992,
              "segments": {
                "table": "brewery_area_segment",
                "joinColumns": [{ "name": "brewery_id", "referencedField": "identifier" }],
                "tileColumn": "tile_id",
                "geometryColumn": "geometry",
                "tiles": { "table": "tile", "idColumn": "id", "geometryColumn": "geometry" }
              }
            }
          },
          {
            "kind": "object",
            "name": "owner",
            "target": "Person",
            "relation": { "joinColumns": [{ "name": "owner_id", "referencedField": "identifier" }] }
          },
          { "kind": "object", "name": "beers", "target": "Beer", "isList": true, "relation": { "mappedBy": "brewery" } }
        ]
      },
      {
        "name": "Person",
        "table": "person",
        "keyFields": ["identifier"],
        "fields": [
          { "kind": "scalar", "name": "identifier", "column": "id", "type": "Int" },
          { "kind": "scalar", "name": "name", "column": "name", "type": "String" }
        ]
      },
      {
        "name": "Label",
        "table": "label",
        "fields": [{ "kind": "scalar", "name": "text", "column": "text", "type": "String" }]
      },
      {
        "name": "Address",
        "table": "brewery",
        "fields": [
          { "kind": "scalar", "name": "street", "column": "street", "type": "String" },
          { "kind": "scalar", "name": "city", "column": "city", "type": "String" }
        ]
      },
      {
        "name": "Ingredient",
        "table": "ingredient",
        "keyFields": ["code"],
        "fields": [
          { "kind": "scalar", "name": "code", "column": "code", "type": "String" },
          { "kind": "scalar", "name": "name", "column": "name", "type": "String" },
          {
            "kind": "object",
            "name": "beers",
            "target": "Beer",
            "isList": true,
            "relation": { "mappedBy": "ingredients" }
          }
        ]
      }
    ]
"#};

pub fn schema() -> Schema {
    Schema::from_json(SCHEMA).unwrap()
}

/// WGS 84 has a pre-projected column, ETRS89 is close enough to be relabelled from it.
pub fn registry() -> StaticCrsRegistry {
    StaticCrsRegistry::new()
        .with_suffix(4326, "_wgs84")
        .with_equivalent(4258, 4326)
}

pub fn inline_settings() -> CompilerSettings {
    CompilerSettings {
        param_mode: ParamMode::Inline,
        ..Default::default()
    }
}

pub fn builder(schema: &Schema) -> SqlQueryBuilder<'_, Postgres> {
    SqlQueryBuilder::new(schema)
        .with_settings(inline_settings())
        .with_crs_registry(registry())
}

pub fn collection(request: impl Into<CollectionRequest>) -> Result<CompiledSelect, SqlError> {
    builder(&schema()).compile_collection(&request.into())
}

pub fn object(request: ObjectRequest) -> Result<CompiledSelect, SqlError> {
    builder(&schema()).compile_object(&request)
}

/// A builder with the default settings, binding every value as a parameter.
pub fn bound_builder(schema: &Schema) -> SqlQueryBuilder<'_, Postgres> {
    SqlQueryBuilder::new(schema).with_crs_registry(registry())
}

pub fn batch(request: BatchRequest) -> Result<CompiledBatch, SqlError> {
    builder(&schema()).compile_batch(&request)
}

pub fn sql(compiled: Result<CompiledSelect, SqlError>) -> String {
    compiled.unwrap().query.sql
}
