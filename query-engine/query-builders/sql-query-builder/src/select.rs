use std::collections::HashMap;

use query_builder::{FieldAssembler, RowAssembler};
use query_structure::{
    AggregateFunction, AggregateObjectRequest, CollectionRequest, Entity, Field, JoinCriteria, KeyMap,
    ObjectFieldKind, ObjectFieldRequest, ObjectRequest, ScalarType, SortDirection,
};

use crate::{
    Context, SqlError,
    aggregate::{AggregateSource, aggregate_expression},
    ast::*,
    filter::{FilterVisitor, Scope},
    join_utils::RelationLink,
    spatial,
};

/// Builds one `select` per request tree. Nested objects become lateral sub-selects.
pub(crate) struct SelectBuilder<'a, 'b> {
    ctx: &'b Context<'a>,
}

/// Ties a node to the row of its parent.
pub(crate) struct ParentLink<'l> {
    pub(crate) link: &'l RelationLink<'l>,
    pub(crate) alias: &'l str,
    /// Also project the child-side join columns, to tell missing children from missing parents.
    pub(crate) project_exists: bool,
}

/// The query of one node of the request tree.
pub(crate) struct NodeSelect {
    pub(crate) select: Select,
    pub(crate) assembler: RowAssembler,
    pub(crate) exists_aliases: Vec<String>,
}

/// Projections and joins accumulated for one sub-query.
#[derive(Default)]
struct SelectContext {
    columns: Vec<Expression>,
    joins: Vec<Join>,
    projected: HashMap<Column, String>,
}

impl SelectContext {
    /// Projects `column` once, returning the alias it is read as.
    fn project_column(&mut self, ctx: &Context<'_>, column: Column) -> String {
        if let Some(alias) = self.projected.get(&column) {
            return alias.clone();
        }

        let alias = ctx.next_field_alias().to_string();

        self.columns.push(Expression::from(column.clone()).alias(alias.clone()));
        self.projected.insert(column, alias.clone());

        alias
    }

    fn project_expression(&mut self, ctx: &Context<'_>, expression: Expression) -> String {
        let alias = ctx.next_field_alias().to_string();
        self.columns.push(expression.alias(alias.clone()));

        alias
    }

    /// `left join lateral (select) as alias on true`, with all of its columns projected.
    fn join_lateral(&mut self, select: Select, alias: String) {
        let table = Table::from(select).alias(alias.clone());

        self.joins
            .push(Join::Left(table.on(ConditionTree::NoCondition).lateral()));
        self.columns.push(asterisk(alias));
    }
}

/// Response fields of one object.
#[derive(Default)]
struct ObjectContext {
    fields: Vec<(String, FieldAssembler)>,
    check_null: Option<String>,
}

impl<'a, 'b> SelectBuilder<'a, 'b> {
    pub(crate) fn new(ctx: &'b Context<'a>) -> Self {
        Self { ctx }
    }

    #[tracing::instrument(skip_all, fields(entity = %request.entity))]
    pub(crate) fn build_object(&self, request: &ObjectRequest) -> crate::Result<(Select, RowAssembler)> {
        let node = self.build_node(request, None)?;

        Ok((node.select, node.assembler))
    }

    /// Collection criteria apply to the root rows, after the criteria of the root object.
    #[tracing::instrument(skip_all, fields(entity = %request.object.entity))]
    pub(crate) fn build_collection(&self, request: &CollectionRequest) -> crate::Result<(Select, RowAssembler)> {
        let mut root = request.object.clone();

        root.filters.extend(request.filters.iter().cloned());
        root.sort.extend(request.sort.iter().cloned());

        if request.paging.is_some() {
            root.paging = request.paging;
        }

        let node = self.build_node(&root, None)?;

        Ok((node.select, node.assembler))
    }

    pub(crate) fn build_node(&self, request: &ObjectRequest, parent: Option<ParentLink<'_>>) -> crate::Result<NodeSelect> {
        let ctx = self.ctx;
        let entity = ctx.schema().entity(&request.entity)?;
        let alias = ctx.next_table_alias().to_string();
        let table = ctx.entity_table(entity, &request.context).alias(alias.clone());

        let correlation = parent
            .as_ref()
            .map(|parent| parent.link.correlate(ctx, parent.alias, &alias));

        let mut sc = SelectContext::default();
        let mut oc = self.project_fields(entity, &alias, request, &mut sc, true)?;

        let ordering = request
            .sort
            .iter()
            .map(|criteria| {
                let field = entity.scalar_field(&criteria.field)?;
                let sorted = sc.project_column(ctx, Column::from((alias.as_str(), field.column.as_str())));

                Ok(match criteria.direction {
                    SortDirection::Ascending => Column::new(sorted).ascend(),
                    SortDirection::Descending => Column::new(sorted).descend(),
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let filters = FilterVisitor::new(ctx).visit_all(&request.filters, Scope::new(entity, &alias))?;
        let (key_condition, key_join) = self.key_criteria(entity, &alias, &request.keys)?;

        let (mut joins, correlation_condition, exists_columns) = match correlation {
            Some(correlation) => (correlation.joins, correlation.condition, correlation.exists_columns),
            None => (Vec::new(), ConditionTree::NoCondition, Vec::new()),
        };

        let exists_aliases = match parent {
            Some(ParentLink { project_exists: true, .. }) => exists_columns
                .iter()
                .map(|column| sc.project_column(ctx, column.clone()))
                .collect(),
            _ => Vec::new(),
        };

        // Without a key, a matched child is recognized by its join columns.
        if oc.check_null.is_none() {
            if let Some(column) = exists_columns.first() {
                oc.check_null = Some(sc.project_column(ctx, column.clone()));
            }
        }

        if sc.columns.is_empty() {
            return Err(SqlError::InvalidRequest(format!(
                "nothing is selected from `{}`",
                entity.name
            )));
        }

        joins.extend(key_join);
        joins.extend(sc.joins);

        let mut select = Select::from_table(table)
            .columns(sc.columns)
            .joins(joins)
            .so_that(correlation_condition.and(filters).and(key_condition));

        for definition in ordering {
            select = select.order_by(definition);
        }

        if let Some(paging) = request.paging {
            if let Some(limit) = paging.limit {
                select = select.limit(limit);
            }

            if let Some(offset) = paging.offset {
                select = select.offset(offset);
            }
        }

        Ok(NodeSelect {
            select,
            assembler: RowAssembler::new(oc.fields, oc.check_null),
            exists_aliases,
        })
    }

    /// Projects the response fields of `request` from the table aliased `alias`.
    ///
    /// Nodes read their first key field even when it is not selected, to detect missing rows.
    fn project_fields(
        &self,
        entity: &Entity,
        alias: &str,
        request: &ObjectRequest,
        sc: &mut SelectContext,
        implicit_key: bool,
    ) -> crate::Result<ObjectContext> {
        let ctx = self.ctx;
        let mut oc = ObjectContext::default();

        for selected in &request.selected_fields {
            let field = match entity.field(&selected.name)? {
                Field::Scalar(field) => field,
                Field::Object(_) => {
                    return Err(SqlError::InvalidRequest(format!(
                        "`{}.{}` is an object field and needs a nested request",
                        entity.name, selected.name
                    )));
                }
            };

            let expression = spatial::geometry_output(ctx, alias, field, selected.srid)?;

            let projected = match expression.kind {
                ExpressionKind::Column(column) => sc.project_column(ctx, *column),
                kind => sc.project_expression(ctx, Expression::new(kind)),
            };

            if oc.check_null.is_none() && entity.is_key_field(&field.name) {
                oc.check_null = Some(projected.clone());
            }

            oc.fields.push((selected.alias.clone(), FieldAssembler::Column(projected)));
        }

        if implicit_key && oc.check_null.is_none() {
            if let Some(key) = entity.key_fields()?.first() {
                oc.check_null = Some(sc.project_column(ctx, Column::from((alias, key.column.as_str()))));
            }
        }

        for object in &request.object_fields {
            self.project_object(entity, alias, object, sc, &mut oc)?;
        }

        for aggregate in &request.aggregate_fields {
            self.project_aggregate(entity, alias, aggregate, sc, &mut oc)?;
        }

        Ok(oc)
    }

    fn project_object(
        &self,
        entity: &Entity,
        alias: &str,
        object: &ObjectFieldRequest,
        sc: &mut SelectContext,
        oc: &mut ObjectContext,
    ) -> crate::Result<()> {
        let ctx = self.ctx;
        let schema = ctx.schema();
        let field = entity.object_field(&object.field)?;

        if object.request.entity != field.target {
            return Err(SqlError::InvalidRequest(format!(
                "`{}.{}` points at `{}`, not `{}`",
                entity.name, field.name, field.target, object.request.entity
            )));
        }

        match &field.kind {
            ObjectFieldKind::Embedded => {
                if object.request.has_row_criteria() {
                    return Err(SqlError::InvalidRequest(format!(
                        "embedded object `{}.{}` cannot be filtered, sorted, paged or keyed",
                        entity.name, field.name
                    )));
                }

                let target = schema.entity(&field.target)?;
                let embedded = self.project_fields(target, alias, &object.request, sc, false)?;

                oc.fields.push((
                    object.alias.clone(),
                    FieldAssembler::Object(RowAssembler::new(embedded.fields, None)),
                ));
            }
            ObjectFieldKind::Related(_) if field.is_list => {
                // Fetched by a batch query, keyed by the columns projected here.
                let link = RelationLink::resolve(schema, entity, field)?;

                let columns = link
                    .parent_columns()
                    .into_iter()
                    .map(|column| (column.to_owned(), sc.project_column(ctx, Column::from((alias, column)))))
                    .collect();

                oc.fields
                    .push((format!("$join:{}", object.alias), FieldAssembler::JoinKey(columns)));
            }
            ObjectFieldKind::Related(_) => {
                let wrapper = ctx.next_table_alias().to_string();
                let link = RelationLink::resolve(schema, entity, field)?;

                let parent = ParentLink {
                    link: &link,
                    alias,
                    project_exists: false,
                };

                let child = self.build_node(&object.request, Some(parent))?;

                sc.join_lateral(child.select.first_row(), wrapper);
                oc.fields
                    .push((object.alias.clone(), FieldAssembler::Object(child.assembler)));
            }
        }

        Ok(())
    }

    /// Aggregates over the same relation share one lateral sub-select. Concatenating a list field needs
    /// the list unnested first, so each of those gets its own.
    fn project_aggregate(
        &self,
        entity: &Entity,
        alias: &str,
        aggregate: &AggregateObjectRequest,
        sc: &mut SelectContext,
        oc: &mut ObjectContext,
    ) -> crate::Result<()> {
        let ctx = self.ctx;
        let field = entity.object_field(&aggregate.field)?;
        let link = RelationLink::resolve(ctx.schema(), entity, field)?;
        let target = link.child;

        let mut shared = Vec::new();
        let mut unnested = Vec::new();

        for (index, request) in aggregate.aggregates.iter().enumerate() {
            let field = request
                .field
                .as_deref()
                .map(|name| target.scalar_field(name))
                .transpose()?;

            match field {
                Some(field) if field.is_list && request.function == AggregateFunction::Join => {
                    unnested.push((index, request, field))
                }
                field => shared.push((index, request, field)),
            }
        }

        let mut aliases = vec![String::new(); aggregate.aggregates.len()];

        if !shared.is_empty() {
            let (wrapper, source_alias, mut select) = self.aggregate_select(&link, alias, aggregate)?;

            for (index, request, field) in shared {
                let source = field.map(|field| AggregateSource {
                    field,
                    column: Column::from((source_alias.as_str(), field.column.as_str())),
                });

                let result = ctx.next_field_alias().to_string();
                select = select.value(aggregate_expression(request, source, &result)?);
                aliases[index] = result;
            }

            sc.join_lateral(select, wrapper);
        }

        for (index, request, field) in unnested {
            let (wrapper, source_alias, select) = self.aggregate_select(&link, alias, aggregate)?;
            let elements_alias = ctx.next_table_alias().to_string();
            let element = ctx.next_field_alias().to_string();

            let elements = Table::from(unnest(Column::from((source_alias.as_str(), field.column.as_str()))))
                .alias(elements_alias.clone())
                .column_aliases([element.clone()]);

            let source = AggregateSource {
                field,
                column: Column::from((elements_alias, element)),
            };

            let result = ctx.next_field_alias().to_string();

            let select = select
                .inner_join(elements.on(ConditionTree::NoCondition).lateral())
                .value(aggregate_expression(request, Some(source), &result)?);

            aliases[index] = result;
            sc.join_lateral(select, wrapper);
        }

        let fields = aggregate
            .aggregates
            .iter()
            .zip(aliases)
            .map(|(request, alias)| (request.alias.clone(), FieldAssembler::Column(alias)))
            .collect();

        oc.fields
            .push((aggregate.alias.clone(), FieldAssembler::Object(RowAssembler::new(fields, None))));

        Ok(())
    }

    /// The related rows an aggregate runs over: `(wrapper alias, source alias, select)`.
    fn aggregate_select(
        &self,
        link: &RelationLink<'_>,
        parent_alias: &str,
        aggregate: &AggregateObjectRequest,
    ) -> crate::Result<(String, String, Select)> {
        let ctx = self.ctx;
        let wrapper = ctx.next_table_alias().to_string();
        let source_alias = ctx.next_table_alias().to_string();

        let correlation = link.correlate(ctx, parent_alias, &source_alias);
        let filters =
            FilterVisitor::new(ctx).visit_all(&aggregate.filters, Scope::new(link.child, &source_alias))?;

        let select = Select::from_table(ctx.table(&link.child.table).alias(source_alias.clone()))
            .joins(correlation.joins)
            .so_that(correlation.condition.and(filters));

        Ok((wrapper, source_alias, select))
    }

    /// One key compiles to equalities, several to an inner join on a `values` table.
    fn key_criteria(
        &self,
        entity: &Entity,
        alias: &str,
        keys: &[KeyMap],
    ) -> crate::Result<(ConditionTree, Option<Join>)> {
        match keys {
            [] => Ok((ConditionTree::NoCondition, None)),
            [key] => {
                let conditions = key
                    .iter()
                    .map(|(name, value)| {
                        let field = entity.scalar_field(name)?;

                        Ok(Column::from((alias, field.column.as_str()))
                            .equals(val(value.clone()))
                            .into())
                    })
                    .collect::<crate::Result<Vec<ConditionTree>>>()?;

                Ok((ConditionTree::all(conditions), None))
            }
            keys => {
                let criteria = JoinCriteria::new(keys.iter().cloned())?;
                let names: Vec<&str> = criteria.key_names().collect();
                let values_alias = self.ctx.next_table_alias().to_string();

                let types = names
                    .iter()
                    .map(|name| Ok(Some(entity.scalar_field(name)?.type_identifier)))
                    .collect::<crate::Result<Vec<_>>>()?;

                let on = names
                    .iter()
                    .map(|name| {
                        let field = entity.scalar_field(name)?;

                        Ok(Column::from((alias, field.column.as_str()))
                            .equals(Column::from((values_alias.as_str(), *name)))
                            .into())
                    })
                    .collect::<crate::Result<Vec<ConditionTree>>>()?;

                let values = Table::from(key_values(&criteria, &types))
                    .alias(values_alias.clone())
                    .column_aliases(names.iter().copied());

                Ok((
                    ConditionTree::NoCondition,
                    Some(Join::Inner(values.on(ConditionTree::all(on)))),
                ))
            }
        }
    }
}

/// One `values` row per key. Cells are typed, a bound `values` column is `text` otherwise.
pub(crate) fn key_values(criteria: &JoinCriteria, types: &[Option<ScalarType>]) -> Values {
    let rows = criteria
        .keys()
        .iter()
        .map(|key| {
            key.values()
                .zip(types)
                .map(|(value, ty)| match ty {
                    Some(ty) => typed_val(value.clone(), column_type(*ty)),
                    None => val(value.clone()),
                })
                .collect::<Row>()
        })
        .collect();

    Values::new(rows)
}

fn column_type(ty: ScalarType) -> &'static str {
    match ty {
        ScalarType::String => "text",
        ScalarType::Int => "bigint",
        ScalarType::Float => "numeric",
        ScalarType::Boolean => "boolean",
        ScalarType::DateTime => "timestamptz",
        ScalarType::Json => "jsonb",
        ScalarType::Geometry => "geometry",
    }
}
