use query_structure::{Entity, FieldPath, Filter, ObjectFieldKind, QueryValue, ScalarField, ScalarType};

use crate::{
    Context, SqlError,
    ast::*,
    join_utils::RelationLink,
    spatial,
};

/// The entity a filter is evaluated against, and the alias its table is read as.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'s> {
    pub(crate) entity: &'s Entity,
    pub(crate) alias: &'s str,
}

impl<'s> Scope<'s> {
    pub(crate) fn new(entity: &'s Entity, alias: &'s str) -> Self {
        Self { entity, alias }
    }

    fn column(&self, field: &ScalarField) -> Column {
        Column::from((self.alias, field.column.as_str()))
    }
}

/// Compiles filters into conditions.
pub(crate) struct FilterVisitor<'a, 'b> {
    ctx: &'b Context<'a>,
}

impl<'a, 'b> FilterVisitor<'a, 'b> {
    pub(crate) fn new(ctx: &'b Context<'a>) -> Self {
        Self { ctx }
    }

    /// The conjunction of all filters.
    pub(crate) fn visit_all(&self, filters: &[Filter], scope: Scope<'_>) -> crate::Result<ConditionTree> {
        let conditions = filters
            .iter()
            .map(|filter| self.visit(filter, scope))
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(ConditionTree::all(conditions))
    }

    pub(crate) fn visit(&self, filter: &Filter, scope: Scope<'_>) -> crate::Result<ConditionTree> {
        match filter {
            Filter::Not(inner) => Ok(self.visit(inner, scope)?.not()),
            Filter::And(filters) => self.visit_all(filters, scope),
            Filter::Or(filters) => {
                let conditions = filters
                    .iter()
                    .map(|filter| self.visit(filter, scope))
                    .collect::<crate::Result<Vec<_>>>()?;

                Ok(ConditionTree::any(conditions))
            }
            Filter::Equals { path, .. }
            | Filter::GreaterThan { path, .. }
            | Filter::LowerThan { path, .. }
            | Filter::In { path, .. }
                if !path.is_leaf() =>
            {
                self.visit_hop(filter, path, scope)
            }
            Filter::Spatial(sf) if !sf.path.is_leaf() => self.visit_hop(filter, &sf.path, scope),
            Filter::Equals { path, value } => self.visit_equals(scope, path.first(), value),
            Filter::GreaterThan { path, value, inclusive } => {
                let (field, column) = self.comparable(scope, path.first(), value)?;
                let condition = match *inclusive {
                    true => column.greater_than_or_equals(val(value.clone())),
                    false => column.greater_than(val(value.clone())),
                };

                tracing::trace!(field = %field.name, inclusive = *inclusive, "greater than");
                Ok(condition.into())
            }
            Filter::LowerThan { path, value, inclusive } => {
                let (field, column) = self.comparable(scope, path.first(), value)?;
                let condition = match *inclusive {
                    true => column.less_than_or_equals(val(value.clone())),
                    false => column.less_than(val(value.clone())),
                };

                tracing::trace!(field = %field.name, inclusive = *inclusive, "lower than");
                Ok(condition.into())
            }
            Filter::In { path, values } => {
                let field = self.scalar(scope, path.first())?;

                if field.is_list || field.type_identifier == ScalarType::Geometry {
                    return Err(SqlError::unsupported_filter(
                        &field.name,
                        format!("`in` is not supported on {} fields", describe(field)),
                    ));
                }

                match values.is_empty() {
                    true => Ok(ConditionTree::NegativeCondition),
                    false => Ok(scope
                        .column(field)
                        .in_selection(values.iter().cloned().map(val).collect())
                        .into()),
                }
            }
            Filter::Spatial(sf) => {
                let field = self.scalar(scope, sf.path.first())?;
                spatial::spatial_condition(self.ctx, scope.entity, scope.alias, field, sf)
            }
        }
    }

    /// Follows the first segment of a multi-segment path.
    ///
    /// Embedded objects live in the same row, related ones are matched with `exists`.
    fn visit_hop(&self, filter: &Filter, path: &FieldPath, scope: Scope<'_>) -> crate::Result<ConditionTree> {
        let schema = self.ctx.schema();
        let field = scope.entity.object_field(path.first())?;
        let target = schema.entity(&field.target)?;

        let nested = filter
            .strip_first_hop()
            .ok_or(SqlError::MissingInput("filter path below an object field"))?;

        match &field.kind {
            ObjectFieldKind::Embedded => self.visit(&nested, Scope::new(target, scope.alias)),
            ObjectFieldKind::Related(_) => {
                let link = RelationLink::resolve(schema, scope.entity, field)?;
                let alias = self.ctx.next_table_alias().to_string();
                let correlation = link.correlate(self.ctx, scope.alias, &alias);
                let condition = self.visit(&nested, Scope::new(target, &alias))?;

                let select = Select::from_table(self.ctx.table(&target.table).alias(alias.clone()))
                    .value(raw(1))
                    .joins(correlation.joins)
                    .so_that(correlation.condition.and(condition));

                Ok(exists(select).into())
            }
        }
    }

    fn visit_equals(&self, scope: Scope<'_>, name: &str, value: &QueryValue) -> crate::Result<ConditionTree> {
        let field = self.scalar(scope, name)?;

        if field.type_identifier == ScalarType::Geometry {
            return Err(SqlError::unsupported_filter(
                &field.name,
                "geometry fields are compared with spatial filters",
            ));
        }

        let column = scope.column(field);

        let condition = match (value, field.is_list) {
            (QueryValue::Null, _) => column.is_null(),
            (value, true) => val(value.clone()).equals_any(column),
            (value, false) => column.equals(val(value.clone())),
        };

        Ok(condition.into())
    }

    /// A field that can be ordered against `value`.
    fn comparable<'s>(
        &self,
        scope: Scope<'s>,
        name: &str,
        value: &QueryValue,
    ) -> crate::Result<(&'s ScalarField, Column)> {
        let field = self.scalar(scope, name)?;

        let ordered = !field.is_list
            && !matches!(
                field.type_identifier,
                ScalarType::Geometry | ScalarType::Json | ScalarType::Boolean
            );

        if !ordered {
            return Err(SqlError::unsupported_filter(
                &field.name,
                format!("range comparisons are not supported on {} fields", describe(field)),
            ));
        }

        if value.is_null() {
            return Err(SqlError::unsupported_filter(&field.name, "cannot compare against null"));
        }

        Ok((field, scope.column(field)))
    }

    fn scalar<'s>(&self, scope: Scope<'s>, name: &str) -> crate::Result<&'s ScalarField> {
        match scope.entity.field(name)? {
            query_structure::Field::Scalar(field) => Ok(field),
            query_structure::Field::Object(_) => Err(SqlError::unsupported_filter(
                format!("{}.{}", scope.entity.name, name),
                "object fields are filtered through their own fields",
            )),
        }
    }
}

fn describe(field: &ScalarField) -> String {
    match field.is_list {
        true => format!("list of {}", field.type_identifier),
        false => field.type_identifier.to_string(),
    }
}
