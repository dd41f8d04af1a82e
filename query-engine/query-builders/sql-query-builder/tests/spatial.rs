mod common;

use common::*;
use pretty_assertions::assert_eq;
use query_structure::*;
use serde_json::{Value, json};
use sql_query_builder::{ErrorKind, SqlError};

const SELECT_BREWERY: &str = r#"select "t1"."name" as "x1", "t1"."id" as "x2" from "brewery" as "t1""#;

fn spatial(field: &str, operator: SpatialOperator, geometry: GeometryInput, srid: Option<i32>) -> Filter {
    Filter::Spatial(SpatialFilter {
        path: field.into(),
        operator,
        geometry: Some(geometry),
        srid,
    })
}

fn wkt(text: &str) -> GeometryInput {
    GeometryInput::Wkt(text.to_owned())
}

fn geojson(value: Value) -> GeometryInput {
    match value {
        Value::Object(map) => GeometryInput::GeoJson(map),
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn breweries(filter: Filter) -> std::result::Result<String, SqlError> {
    let request = CollectionRequest::new(ObjectRequest::new("Brewery").select("name")).filter(filter);

    collection(request).map(|compiled| compiled.query.sql)
}

#[test]
fn literals_in_the_native_srid_compare_directly() {
    let filter = spatial(
        "geometry",
        SpatialOperator::Within,
        wkt("POLYGON((0 0, 1 0, 1 1, 0 0))"),
        None,
    );

    assert_eq!(
        breweries(filter).unwrap(),
        format!(
            r#"{SELECT_BREWERY} where ST_Within("t1"."geometry", ST_GeomFromText('POLYGON((0 0, 1 0, 1 1, 0 0))', 28992))"#
        )
    );
}

#[test]
fn literals_with_a_registered_srid_use_the_projected_column() {
    let filter = spatial(
        "geometry",
        SpatialOperator::Contains,
        wkt("SRID=4326;POINT(4.9 52.37)"),
        None,
    );

    assert_eq!(
        breweries(filter).unwrap(),
        format!(
            r#"{SELECT_BREWERY} where ST_Contains("t1"."geometry_wgs84", ST_GeomFromText('POINT(4.9 52.37)', 4326))"#
        )
    );
}

#[test]
fn other_literals_are_transformed_to_the_native_srid() {
    let point = json!({ "type": "Point", "coordinates": [1, 2] });
    let filter = spatial("geometry", SpatialOperator::Intersects, geojson(point), Some(3857));

    assert_eq!(
        breweries(filter).unwrap(),
        format!(
            r#"{SELECT_BREWERY} where ST_Intersects("t1"."geometry", ST_Transform(ST_SetSRID(ST_GeomFromGeoJSON('{{"type":"Point","coordinates":[1,2]}}'), 3857), 28992))"#
        )
    );
}

#[test]
fn srid_and_type_filters_do_not_restrict_direct_columns() {
    for operator in [SpatialOperator::Srid, SpatialOperator::Type] {
        let filter = spatial("geometry", operator, wkt("POINT(1 2)"), None);

        assert_eq!(breweries(filter).unwrap(), SELECT_BREWERY);
    }
}

#[test]
fn segmented_intersection_checks_overlapping_segments() {
    let filter = spatial(
        "area",
        SpatialOperator::Intersects,
        wkt("POLYGON((0 0, 10 0, 10 10, 0 0))"),
        None,
    );

    let literal = "ST_GeomFromText('POLYGON((0 0, 10 0, 10 10, 0 0))', 28992)";
    let pieces = format!(
        r#"select "t3"."id" as "x3", ST_Intersection("t3"."geometry", {literal}) as "x4" from "tile" as "t3" where ST_Intersects("t3"."geometry", {literal})"#
    );

    assert_eq!(
        breweries(filter).unwrap(),
        format!(
            r#"{SELECT_BREWERY} where exists (select 1 from ({pieces}) as "t2" inner join "brewery_area_segment" as "t4" on "t4"."tile_id" = "t2"."x3" where ("t4"."brewery_id" = "t1"."id" and ST_Intersects("t4"."geometry", "t2"."x4")))"#
        )
    );
}

#[test]
fn segmented_predicates_must_hold_for_every_overlapping_segment() {
    let filter = spatial(
        "area",
        SpatialOperator::Within,
        wkt("POLYGON((0 0, 10 0, 10 10, 0 0))"),
        None,
    );

    let sql = breweries(filter).unwrap();

    assert!(sql.contains(r#"where (exists (select 1 from (select "t3"."id" as "x3""#));
    assert!(sql.contains(r#"and not exists (select 1 from (select "t6"."id" as "x5""#));
    assert!(sql.ends_with(r#"where ("t7"."brewery_id" = "t1"."id" and not(ST_Within("t7"."geometry", "t5"."x6")))))"#));
}

#[test]
fn segmented_columns_reject_metadata_operators() {
    let filter = spatial("area", SpatialOperator::Srid, wkt("POINT(1 2)"), None);

    assert!(matches!(
        breweries(filter),
        Err(SqlError::UnsupportedSpatialOperator {
            operator: SpatialOperator::Srid,
            strategy: "segmented"
        })
    ));
}

#[test]
fn geometry_input_errors() {
    let missing = Filter::Spatial(SpatialFilter {
        path: "geometry".into(),
        operator: SpatialOperator::Within,
        geometry: None,
        srid: None,
    });

    assert!(matches!(breweries(missing), Err(SqlError::MissingInput(_))));

    let err = breweries(spatial("geometry", SpatialOperator::Within, wkt("POLYGON((0 0, 1 0"), None)).unwrap_err();

    assert!(matches!(err, SqlError::MalformedGeometry { ref input, .. } if input == "POLYGON((0 0, 1 0"));
    assert_eq!(err.kind(), ErrorKind::Data);
    assert!(!err.is_retryable());
}

#[test]
fn spatial_filters_on_plain_fields_are_unsupported() {
    let filter = spatial("name", SpatialOperator::Within, wkt("POINT(1 2)"), None);

    assert!(matches!(breweries(filter), Err(SqlError::UnsupportedFilter { .. })));
}
