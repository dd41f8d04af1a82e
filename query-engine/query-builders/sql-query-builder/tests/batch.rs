mod common;

use common::*;
use pretty_assertions::assert_eq;
use query_builder::FlatRow;
use query_structure::*;
use sql_query_builder::SqlError;

fn key(name: &str, value: i64) -> KeyMap {
    KeyMap::from([(name.to_owned(), QueryValue::Int(value))])
}

fn row(pairs: &[(&str, QueryValue)]) -> FlatRow {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn beer(name: &str) -> QueryValue {
    QueryValue::Object(vec![("name".into(), name.into())])
}

#[test]
fn one_to_many_batches_page_per_parent() {
    let keys = JoinCriteria::new([key("id", 1), key("id", 2)]).unwrap();
    let request = ObjectRequest::new("Beer")
        .select("name")
        .sort(SortCriteria::asc("name"))
        .paging(Paging::limit(2));

    let compiled = batch(BatchRequest::new("Brewery", "beers", keys, request)).unwrap();

    assert_eq!(
        compiled.query.sql,
        r#"select "t1"."id" as "x1", "t2".* from (values (1), (2)) as "t1"("id") left join lateral (select "t3"."name" as "x2", "t3"."id" as "x3", "t3"."brewery_id" as "x4" from "beer" as "t3" where "t3"."brewery_id" = "t1"."id" order by "x2" asc limit 2) as "t2" on true"#
    );

    assert_eq!(compiled.grouping.key_columns(), &[("id".to_owned(), "x1".to_owned())]);
    assert_eq!(compiled.grouping.exists_aliases(), &["x4".to_owned()]);
}

#[test]
fn bound_parent_keys_are_cast_to_the_column_type() {
    let schema = schema();
    let keys = JoinCriteria::new([key("id", 1), key("id", 2)]).unwrap();
    let request = BatchRequest::new("Brewery", "beers", keys, ObjectRequest::new("Beer").select("name"));

    let compiled = bound_builder(&schema).compile_batch(&request).unwrap();

    assert_eq!(
        compiled.query.sql,
        r#"select "t1"."id" as "x1", "t2".* from (values (cast($1 as bigint)), (cast($2 as bigint))) as "t1"("id") left join lateral (select "t3"."name" as "x2", "t3"."id" as "x3", "t3"."brewery_id" as "x4" from "beer" as "t3" where "t3"."brewery_id" = "t1"."id") as "t2" on true"#
    );
    assert_eq!(compiled.query.params, vec![QueryValue::Int(1), QueryValue::Int(2)]);
}

#[test]
fn bound_junction_keys_take_the_type_of_the_parent_field() {
    let schema = schema();
    let keys = JoinCriteria::new([KeyMap::from([("code".to_owned(), QueryValue::from("hallertau"))])]).unwrap();
    let request = BatchRequest::new("Ingredient", "beers", keys, ObjectRequest::new("Beer").select("name"));

    let compiled = bound_builder(&schema).compile_batch(&request).unwrap();

    assert!(compiled
        .query
        .sql
        .starts_with(r#"select "t1"."code" as "x1", "t2".* from (values (cast($1 as text))) as "t1"("code")"#));
    assert_eq!(compiled.query.params, vec![QueryValue::from("hallertau")]);
}

#[test]
fn rows_are_grouped_by_parent_key() {
    let keys = JoinCriteria::new([key("id", 1), key("id", 2)]).unwrap();
    let request = ObjectRequest::new("Beer").select("name");

    let compiled = batch(BatchRequest::new("Brewery", "beers", keys, request)).unwrap();

    let rows = vec![
        row(&[
            ("x1", 1.into()),
            ("x2", "Pilsener".into()),
            ("x3", 10.into()),
            ("x4", 1.into()),
        ]),
        row(&[
            ("x1", 1.into()),
            ("x2", "Bock".into()),
            ("x3", 11.into()),
            ("x4", 1.into()),
        ]),
        row(&[
            ("x1", 2.into()),
            ("x2", QueryValue::Null),
            ("x3", QueryValue::Null),
            ("x4", QueryValue::Null),
        ]),
    ];

    let groups = compiled.group(rows);

    assert_eq!(groups[&key("id", 1)], vec![beer("Pilsener"), beer("Bock")]);
    assert!(groups[&key("id", 2)].is_empty());
}

#[test]
fn grouping_consumes_row_streams() {
    let keys = JoinCriteria::new([key("id", 3)]).unwrap();
    let compiled = batch(BatchRequest::new("Brewery", "beers", keys, ObjectRequest::new("Beer").select("name"))).unwrap();

    let rows = futures::stream::iter(vec![Ok::<_, SqlError>(row(&[
        ("x1", 3.into()),
        ("x2", "Tripel".into()),
        ("x3", 12.into()),
        ("x4", 3.into()),
    ]))]);

    let groups =
        futures::executor::block_on(compiled.grouping.group_stream(&compiled.assembler, rows)).unwrap();

    assert_eq!(groups[&key("id", 3)], vec![beer("Tripel")]);
}

#[test]
fn many_to_many_batches_join_the_junction_table() {
    let keys = JoinCriteria::new([key("id", 1)]).unwrap();
    let request = ObjectRequest::new("Ingredient").select("name");

    let compiled = batch(BatchRequest::new("Beer", "ingredients", keys, request)).unwrap();

    assert_eq!(
        compiled.query.sql,
        r#"select "t1"."id" as "x1", "t2".* from (values (1)) as "t1"("id") left join lateral (select "t3"."name" as "x2", "t3"."code" as "x3", "t4"."ingredient_code" as "x4" from "ingredient" as "t3" inner join "beer_ingredient" as "t4" on "t4"."ingredient_code" = "t3"."code" where "t4"."beer_id" = "t1"."id") as "t2" on true"#
    );
}

#[test]
fn keys_must_name_the_parent_columns() {
    let keys = JoinCriteria::new([key("identifier", 1)]).unwrap();
    let request = ObjectRequest::new("Beer").select("name");

    let err = batch(BatchRequest::new("Brewery", "beers", keys, request)).unwrap_err();

    assert!(matches!(
        err,
        SqlError::Domain(DomainError::InconsistentJoinKeys { expected, found })
            if expected == ["id"] && found == ["identifier"]
    ));
}

#[test]
fn embedded_objects_cannot_be_batched() {
    let keys = JoinCriteria::new([key("id", 1)]).unwrap();
    let request = ObjectRequest::new("Address").select("city");

    assert!(matches!(
        batch(BatchRequest::new("Brewery", "address", keys, request)),
        Err(SqlError::InvalidRequest(_))
    ));
}
