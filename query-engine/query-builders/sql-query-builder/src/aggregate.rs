use query_structure::{AggregateFieldRequest, AggregateFunction, NumericType, ScalarField, ScalarType};

use crate::{SqlError, ast::*};

/// The column an aggregate reads, and the field stored in it.
///
/// For list fields the column is the unnested element, not the array.
#[derive(Debug, Clone)]
pub(crate) struct AggregateSource<'s> {
    pub(crate) field: &'s ScalarField,
    pub(crate) column: Column,
}

/// Compiles one aggregate into an expression projected as `result_alias`.
pub(crate) fn aggregate_expression(
    request: &AggregateFieldRequest,
    source: Option<AggregateSource<'_>>,
    result_alias: &str,
) -> crate::Result<Expression> {
    let expression: Expression = match (request.function, source) {
        (AggregateFunction::Count, None) if request.distinct => {
            return Err(SqlError::MissingInput("field of a distinct count"));
        }
        (AggregateFunction::Count, None) => count_all().into(),
        (AggregateFunction::Count, Some(source)) => count(source.column, request.distinct).into(),
        (_, None) => return Err(SqlError::MissingInput("aggregate field")),
        (AggregateFunction::Join, Some(source)) => {
            if source.field.type_identifier != ScalarType::String {
                return Err(unsupported(request, source.field));
            }

            let separator = request.separator.as_deref().unwrap_or(",");
            string_agg(source.column, val(separator), request.distinct).into()
        }
        (AggregateFunction::Sum, Some(source)) => numeric(request, source, sum)?,
        (AggregateFunction::Avg, Some(source)) => numeric(request, source, avg)?,
        (AggregateFunction::Min, Some(source)) => numeric(request, source, min)?,
        (AggregateFunction::Max, Some(source)) => numeric(request, source, max)?,
    };

    Ok(expression.alias(result_alias))
}

/// SUM, AVG, MIN and MAX, cast to the requested numeric type.
fn numeric(
    request: &AggregateFieldRequest,
    source: AggregateSource<'_>,
    aggregate: fn(Column) -> Function,
) -> crate::Result<Expression> {
    let function = request.function;

    if !source.field.type_identifier.is_numeric() || source.field.is_list {
        return Err(unsupported(request, source.field));
    }

    if request.distinct {
        return Err(SqlError::InvalidRequest(format!(
            "distinct is only supported for COUNT and JOIN, not {function}"
        )));
    }

    let result_type = request.result_type.unwrap_or(match (function, source.field.type_identifier) {
        (AggregateFunction::Avg, _) | (_, ScalarType::Float) => NumericType::Float,
        _ => NumericType::Int,
    });

    tracing::trace!(%function, field = %source.field.name, ?result_type, "numeric aggregate");
    Ok(cast(aggregate(source.column), sql_type(result_type)).into())
}

fn sql_type(result_type: NumericType) -> &'static str {
    match result_type {
        NumericType::Int => "integer",
        NumericType::Float => "decimal",
    }
}

fn unsupported(request: &AggregateFieldRequest, field: &ScalarField) -> SqlError {
    SqlError::UnsupportedAggregate {
        function: request.function,
        field: field.name.clone(),
        scalar_type: field.type_identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::{ParamMode, Postgres, Visitor};
    use pretty_assertions::assert_eq;

    fn render(request: AggregateFieldRequest, field: Option<&ScalarField>) -> crate::Result<String> {
        let source = field.map(|field| AggregateSource {
            field,
            column: Column::from(("t2", field.column.as_str())),
        });

        let expression = aggregate_expression(&request, source, "x1")?;
        let (sql, _) = Postgres::build(Select::default().value(expression), ParamMode::Inline)?;

        Ok(sql)
    }

    #[test]
    fn numeric_aggregates_are_cast_to_their_result_type() {
        let sold = ScalarField::new("soldPerYear", "sold_per_year", ScalarType::Int);

        assert_eq!(
            render(AggregateFieldRequest::sum("total", "soldPerYear"), Some(&sold)).unwrap(),
            r#"select cast(sum("t2"."sold_per_year") as integer) as "x1""#
        );
        assert_eq!(
            render(AggregateFieldRequest::avg("average", "soldPerYear"), Some(&sold)).unwrap(),
            r#"select cast(avg("t2"."sold_per_year") as decimal) as "x1""#
        );
        assert_eq!(
            render(
                AggregateFieldRequest::max("most", "soldPerYear").as_type(NumericType::Float),
                Some(&sold)
            )
            .unwrap(),
            r#"select cast(max("t2"."sold_per_year") as decimal) as "x1""#
        );
    }

    #[test]
    fn counts_with_and_without_fields() {
        let name = ScalarField::new("name", "name", ScalarType::String);

        assert_eq!(
            render(AggregateFieldRequest::count("n"), None).unwrap(),
            r#"select count(*) as "x1""#
        );
        assert_eq!(
            render(AggregateFieldRequest::new("n", AggregateFunction::Count, Some("name")).distinct(), Some(&name))
                .unwrap(),
            r#"select count(distinct "t2"."name") as "x1""#
        );
        assert!(matches!(
            render(AggregateFieldRequest::count("n").distinct(), None),
            Err(SqlError::MissingInput(_))
        ));
    }

    #[test]
    fn join_concatenates_strings_only() {
        let name = ScalarField::new("name", "name", ScalarType::String);
        let abv = ScalarField::new("abv", "abv", ScalarType::Float);

        assert_eq!(
            render(AggregateFieldRequest::join("names", "name", "; "), Some(&name)).unwrap(),
            r#"select string_agg("t2"."name", '; ') as "x1""#
        );
        assert!(matches!(
            render(AggregateFieldRequest::join("names", "abv", ","), Some(&abv)),
            Err(SqlError::UnsupportedAggregate { .. })
        ));
    }

    #[test]
    fn sums_over_strings_are_rejected() {
        let name = ScalarField::new("name", "name", ScalarType::String);
        let err = render(AggregateFieldRequest::sum("total", "name"), Some(&name)).unwrap_err();

        assert_eq!(err.to_string(), "Aggregate SUM is not supported on `name` of type String");
    }

    #[test]
    fn distinct_is_rejected_outside_count_and_join() {
        let sold = ScalarField::new("soldPerYear", "sold_per_year", ScalarType::Int);

        assert_eq!(
            render(AggregateFieldRequest::min("least", "soldPerYear"), Some(&sold)).unwrap(),
            r#"select cast(min("t2"."sold_per_year") as integer) as "x1""#
        );
        assert!(matches!(
            render(AggregateFieldRequest::min("least", "soldPerYear").distinct(), Some(&sold)),
            Err(SqlError::InvalidRequest(_))
        ));
    }
}
