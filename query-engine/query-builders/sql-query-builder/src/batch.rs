use query_builder::{BatchGrouping, RowAssembler};
use query_structure::{BatchRequest, DomainError};

use crate::{
    Context, SqlError,
    ast::*,
    join_utils::RelationLink,
    select::{ParentLink, SelectBuilder, key_values},
};

/// Fetches one relation for many parents:
///
/// ```sql
/// select "t1"."id" as "x1", "t2".* from (values (1), (2)) as "t1"("id")
/// left join lateral (select ... where "t3"."brewery_id" = "t1"."id") as "t2" on true
/// ```
///
/// Every key yields at least one row, so parents without children stay visible to the grouping.
#[tracing::instrument(skip_all, fields(entity = %request.entity, field = %request.field, keys = request.keys.len()))]
pub(crate) fn build_batch(ctx: &Context<'_>, request: &BatchRequest) -> crate::Result<(Select, RowAssembler, BatchGrouping)> {
    let schema = ctx.schema();
    let parent = schema.entity(&request.entity)?;
    let field = parent.object_field(&request.field)?;

    if field.target != request.request.entity {
        return Err(SqlError::InvalidRequest(format!(
            "`{}.{}` points at `{}`, not `{}`",
            parent.name, field.name, field.target, request.request.entity
        )));
    }

    let link = RelationLink::resolve(schema, parent, field)?;
    let names: Vec<&str> = request.keys.key_names().collect();

    let mut expected = link.parent_column_types();
    expected.sort_unstable_by_key(|(column, _)| *column);

    if !names.iter().copied().eq(expected.iter().map(|(column, _)| *column)) {
        return Err(DomainError::InconsistentJoinKeys {
            expected: expected.into_iter().map(|(column, _)| column.to_owned()).collect(),
            found: names.into_iter().map(ToOwned::to_owned).collect(),
        }
        .into());
    }

    let types: Vec<_> = expected.into_iter().map(|(_, ty)| ty).collect();

    let values_alias = ctx.next_table_alias().to_string();

    let key_columns: Vec<(String, String)> = names
        .iter()
        .map(|name| ((*name).to_owned(), ctx.next_field_alias().to_string()))
        .collect();

    let values = Table::from(key_values(&request.keys, &types))
        .alias(values_alias.clone())
        .column_aliases(names.iter().copied());

    let wrapper = ctx.next_table_alias().to_string();

    let parent_link = ParentLink {
        link: &link,
        alias: &values_alias,
        project_exists: true,
    };

    let child = SelectBuilder::new(ctx).build_node(&request.request, Some(parent_link))?;

    let projections = key_columns
        .iter()
        .map(|(name, alias)| Expression::from(Column::from((values_alias.as_str(), name.as_str()))).alias(alias.clone()))
        .chain([asterisk(wrapper.clone())]);

    let select = Select::from_table(values)
        .columns(projections)
        .left_join(
            Table::from(child.select)
                .alias(wrapper)
                .on(ConditionTree::NoCondition)
                .lateral(),
        );

    let grouping = BatchGrouping::new(request.keys.keys().to_vec(), key_columns, child.exists_aliases);

    Ok((select, child.assembler, grouping))
}
