use query_structure::{Entity, GeometryInfo, GeometrySegments, ScalarField, SpatialFilter, SpatialOperator};

use crate::{
    Context, SqlError,
    ast::*,
    geometry::GeometryFormat,
    join_utils::referenced_column,
};

const DIRECT: &str = "direct";
const SEGMENTED: &str = "segmented";

/// Reads a geometry field in the requested output SRID.
///
/// The native column is used as is, then a column pre-projected to the SRID, then a column whose SRID is
/// equivalent to the requested one, relabelled.
pub(crate) fn geometry_output(
    ctx: &Context<'_>,
    alias: &str,
    field: &ScalarField,
    srid: Option<i32>,
) -> crate::Result<Expression> {
    let column = Column::from((alias, field.column.as_str()));

    let Some(requested) = srid else {
        return Ok(column.into());
    };

    let info = field.geometry.as_ref().ok_or_else(|| {
        SqlError::InvalidRequest(format!("`{}` is not a geometry field and has no SRID", field.name))
    })?;

    if requested == info.srid {
        return Ok(column.into());
    }

    let registry = ctx.crs_registry();

    if let Some(column) = suffixed_column(ctx, alias, field, requested) {
        return Ok(column.into());
    }

    if let Some(equivalent) = registry.equivalent_srid(requested) {
        let source = match equivalent == info.srid {
            true => Some(column),
            false => suffixed_column(ctx, alias, field, equivalent),
        };

        if let Some(source) = source {
            tracing::trace!(field = %field.name, requested, equivalent, "relabelling geometry column");
            return Ok(function("ST_SetSRID", vec![source.into(), val(requested)]).into());
        }
    }

    Err(SqlError::UnsupportedReprojection {
        from: info.srid,
        to: requested,
    })
}

/// The condition of a spatial filter on `field` of the `entity` row aliased `alias`.
pub(crate) fn spatial_condition(
    ctx: &Context<'_>,
    entity: &Entity,
    alias: &str,
    field: &ScalarField,
    filter: &SpatialFilter,
) -> crate::Result<ConditionTree> {
    let info = field
        .geometry
        .as_ref()
        .ok_or_else(|| SqlError::unsupported_filter(&field.name, "spatial filters need a geometry field"))?;

    match &info.segments {
        None => direct_condition(ctx, alias, field, info, filter),
        Some(segments) => segmented_condition(ctx, entity, alias, info, segments, filter),
    }
}

fn direct_condition(
    ctx: &Context<'_>,
    alias: &str,
    field: &ScalarField,
    info: &GeometryInfo,
    filter: &SpatialFilter,
) -> crate::Result<ConditionTree> {
    if matches!(filter.operator, SpatialOperator::Srid | SpatialOperator::Type) {
        tracing::trace!(field = %field.name, operator = %filter.operator, "spatial filter without predicate");
        return Ok(ConditionTree::NoCondition);
    }

    let predicate = predicate(filter.operator, DIRECT)?;
    let (literal, srid) = literal(ctx, filter, info.srid)?;

    let (column, literal) = if srid == info.srid {
        (Column::from((alias, field.column.as_str())), literal)
    } else if let Some(column) = suffixed_column(ctx, alias, field, srid) {
        (column, literal)
    } else {
        (Column::from((alias, field.column.as_str())), transform(literal, info.srid))
    };

    Ok(ConditionTree::single(function(predicate, vec![column.into(), literal])))
}

/// Geometries split along a tile grid are compared per segment, against the part of the filter geometry
/// falling into the segment's tile.
fn segmented_condition(
    ctx: &Context<'_>,
    entity: &Entity,
    alias: &str,
    info: &GeometryInfo,
    segments: &GeometrySegments,
    filter: &SpatialFilter,
) -> crate::Result<ConditionTree> {
    let predicate = predicate(filter.operator, SEGMENTED)?;
    let (literal, srid) = literal(ctx, filter, info.srid)?;

    let literal = match srid == info.srid {
        true => literal,
        false => transform(literal, info.srid),
    };

    let overlapping = segment_query(ctx, entity, alias, segments, &literal, |segment, piece| {
        ConditionTree::single(function("ST_Intersects", vec![segment, piece]))
    })?;

    if filter.operator == SpatialOperator::Intersects {
        return Ok(exists(overlapping).into());
    }

    // At least one overlapping segment, and none failing the predicate.
    let failing = segment_query(ctx, entity, alias, segments, &literal, |segment, piece| {
        ConditionTree::single(function(predicate, vec![segment, piece])).not()
    })?;

    Ok(ConditionTree::all([exists(overlapping).into(), not_exists(failing).into()]))
}

/// `select 1` over the segments of the owning row, joined to the pieces of `literal` per tile.
fn segment_query<F>(
    ctx: &Context<'_>,
    entity: &Entity,
    alias: &str,
    segments: &GeometrySegments,
    literal: &Expression,
    condition: F,
) -> crate::Result<Select>
where
    F: FnOnce(Expression, Expression) -> ConditionTree,
{
    let pieces_alias = ctx.next_table_alias().to_string();
    let tiles_alias = ctx.next_table_alias().to_string();
    let segments_alias = ctx.next_table_alias().to_string();
    let tile_id = ctx.next_field_alias().to_string();
    let piece = ctx.next_field_alias().to_string();

    let tile_geometry = || Column::from((tiles_alias.as_str(), segments.tiles.geometry_column.as_str()));

    let pieces = Select::from_table(ctx.table(&segments.tiles.table).alias(tiles_alias.clone()))
        .value(Expression::from(Column::from((tiles_alias.as_str(), segments.tiles.id_column.as_str()))).alias(tile_id.clone()))
        .value(
            Expression::from(function("ST_Intersection", vec![tile_geometry().into(), literal.clone()]))
                .alias(piece.clone()),
        )
        .so_that(ConditionTree::single(function(
            "ST_Intersects",
            vec![tile_geometry().into(), literal.clone()],
        )));

    let owner = segments
        .join_columns
        .iter()
        .map(|jc| {
            Ok(Column::from((segments_alias.as_str(), jc.name.as_str()))
                .equals(Column::from((alias, referenced_column(entity, jc)?)))
                .into())
        })
        .collect::<crate::Result<Vec<ConditionTree>>>()?;

    let segment_table = ctx.table(&segments.table).alias(segments_alias.clone()).on(
        Column::from((segments_alias.as_str(), segments.tile_column.as_str()))
            .equals(Column::from((pieces_alias.as_str(), tile_id.as_str()))),
    );

    let segment_geometry = Column::from((segments_alias.as_str(), segments.geometry_column.as_str()));
    let piece_geometry = Column::from((pieces_alias.as_str(), piece.as_str()));

    Ok(Select::from_table(Table::from(pieces).alias(pieces_alias.clone()))
        .value(raw(1))
        .inner_join(segment_table)
        .so_that(ConditionTree::all(owner).and(condition(segment_geometry.into(), piece_geometry.into()))))
}

fn predicate(operator: SpatialOperator, strategy: &'static str) -> crate::Result<&'static str> {
    match operator {
        SpatialOperator::Contains => Ok("ST_Contains"),
        SpatialOperator::Within => Ok("ST_Within"),
        SpatialOperator::Intersects => Ok("ST_Intersects"),
        SpatialOperator::Touches => Ok("ST_Touches"),
        SpatialOperator::Srid | SpatialOperator::Type => {
            Err(SqlError::UnsupportedSpatialOperator { operator, strategy })
        }
    }
}

/// The filter geometry as an SQL expression, with the SRID it is expressed in.
fn literal(ctx: &Context<'_>, filter: &SpatialFilter, native_srid: i32) -> crate::Result<(Expression, i32)> {
    let input = filter
        .geometry
        .as_ref()
        .ok_or(SqlError::MissingInput("spatial filter geometry"))?;

    let geometry = ctx.geometry_reader().read(input)?;
    let srid = filter.srid.or(geometry.srid).unwrap_or(native_srid);

    let expression = match geometry.format {
        GeometryFormat::Wkt(text) => function("ST_GeomFromText", vec![val(text), val(srid)]),
        GeometryFormat::GeoJson(json) => function(
            "ST_SetSRID",
            vec![function("ST_GeomFromGeoJSON", vec![val(json)]).into(), val(srid)],
        ),
    };

    Ok((expression.into(), srid))
}

fn transform(literal: Expression, srid: i32) -> Expression {
    function("ST_Transform", vec![literal, val(srid)]).into()
}

fn suffixed_column(ctx: &Context<'_>, alias: &str, field: &ScalarField, srid: i32) -> Option<Column> {
    ctx.crs_registry()
        .column_suffix(srid)
        .map(|suffix| Column::from((alias, format!("{}{}", field.column, suffix))))
}
