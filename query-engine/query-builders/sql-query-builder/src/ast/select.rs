use super::*;
use query_structure::QueryValue;

/// A builder for a `select` statement.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Select {
    pub tables: Vec<Table>,
    pub columns: Vec<Expression>,
    pub conditions: Option<ConditionTree>,
    pub ordering: Vec<OrderDefinition>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
    pub joins: Vec<Join>,
}

impl Select {
    pub fn from_table(table: impl Into<Table>) -> Self {
        Select {
            tables: vec![table.into()],
            ..Default::default()
        }
    }

    /// Selects a value or expression as a column.
    pub fn value(mut self, value: impl Into<Expression>) -> Self {
        self.columns.push(value.into());
        self
    }

    pub fn column(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(column.into().into());
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Expression>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Replaces the `where` conditions.
    pub fn so_that(mut self, conditions: impl Into<ConditionTree>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// Adds conditions to the existing `where` conditions.
    pub fn and_where(mut self, conditions: impl Into<ConditionTree>) -> Self {
        let existing = self.conditions.take().unwrap_or_default();
        self.conditions = Some(existing.and(conditions));
        self
    }

    pub fn inner_join(mut self, join: JoinData) -> Self {
        self.joins.push(Join::Inner(join));
        self
    }

    pub fn left_join(mut self, join: JoinData) -> Self {
        self.joins.push(Join::Left(join));
        self
    }

    pub fn joins(mut self, joins: impl IntoIterator<Item = Join>) -> Self {
        self.joins.extend(joins);
        self
    }

    pub fn order_by(mut self, value: OrderDefinition) -> Self {
        self.ordering.push(value);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(val(QueryValue::Int(limit as i64)));
        self
    }

    /// `limit 1`, written into the query text.
    pub fn first_row(mut self) -> Self {
        self.limit = Some(raw(QueryValue::Int(1)));
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(val(QueryValue::Int(offset as i64)));
        self
    }
}
