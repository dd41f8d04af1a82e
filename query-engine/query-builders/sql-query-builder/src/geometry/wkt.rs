use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0, multispace1, one_of},
    combinator::{all_consuming, consumed, map, map_res, opt, recognize, value},
    multi::{many_m_n, separated_list1},
    sequence::{delimited, pair, tuple},
};

use super::GeometryKind;

/// A checked well-known text literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedWkt<'a> {
    /// From an extended `SRID=n;` prefix.
    pub srid: Option<i32>,
    pub kind: GeometryKind,
    /// The geometry text without the prefix.
    pub text: &'a str,
}

/// Validates `input` as (extended) well-known text.
pub(crate) fn parse(input: &str) -> Result<ParsedWkt<'_>, String> {
    match all_consuming(pair(opt(srid), ws(consumed(geometry))))(input) {
        Ok((_, (srid, (text, kind)))) => Ok(ParsedWkt {
            srid,
            kind,
            text: text.trim(),
        }),
        Err(err) => Err(err.to_string()),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn list<'a, O, F>(item: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(ws(char('(')), separated_list1(ws(char(',')), item), ws(char(')')))
}

fn srid(input: &str) -> IResult<&str, i32> {
    delimited(
        ws(tag_no_case("SRID=")),
        map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| s.parse::<i32>()),
        ws(char(';')),
    )(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), opt(digit1))))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// Two to four ordinates.
fn coordinate(input: &str) -> IResult<&str, ()> {
    let (input, _) = number(input)?;
    let (input, _) = many_m_n(1, 3, pair(multispace1, number))(input)?;

    Ok((input, ()))
}

fn point_body(input: &str) -> IResult<&str, ()> {
    delimited(ws(char('(')), coordinate, ws(char(')')))(input)
}

fn geometry_kind(input: &str) -> IResult<&str, GeometryKind> {
    alt((
        value(GeometryKind::GeometryCollection, tag_no_case("GEOMETRYCOLLECTION")),
        value(GeometryKind::MultiPolygon, tag_no_case("MULTIPOLYGON")),
        value(GeometryKind::MultiLineString, tag_no_case("MULTILINESTRING")),
        value(GeometryKind::MultiPoint, tag_no_case("MULTIPOINT")),
        value(GeometryKind::Polygon, tag_no_case("POLYGON")),
        value(GeometryKind::LineString, tag_no_case("LINESTRING")),
        value(GeometryKind::Point, tag_no_case("POINT")),
    ))(input)
}

fn dimensions(input: &str) -> IResult<&str, &str> {
    ws(alt((tag_no_case("ZM"), tag_no_case("Z"), tag_no_case("M"))))(input)
}

fn body(kind: GeometryKind, input: &str) -> IResult<&str, ()> {
    match kind {
        GeometryKind::Point => point_body(input),
        GeometryKind::LineString => map(list(coordinate), |_| ())(input),
        GeometryKind::Polygon | GeometryKind::MultiLineString => map(list(list(coordinate)), |_| ())(input),
        GeometryKind::MultiPoint => map(list(alt((point_body, coordinate))), |_| ())(input),
        GeometryKind::MultiPolygon => map(list(list(list(coordinate))), |_| ())(input),
        GeometryKind::GeometryCollection => map(list(geometry), |_| ())(input),
    }
}

fn geometry(input: &str) -> IResult<&str, GeometryKind> {
    let (input, kind) = ws(geometry_kind)(input)?;
    let (input, _) = opt(dimensions)(input)?;
    let (input, _) = alt((value((), ws(tag_no_case("EMPTY"))), |i| body(kind, i)))(input)?;

    Ok((input, kind))
}
