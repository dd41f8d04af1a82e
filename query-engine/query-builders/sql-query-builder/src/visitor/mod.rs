//! Visitors for reading an abstract SQL syntax tree, generating the query and
//! gathering parameters in the right order.
mod postgres;

pub use postgres::Postgres;

use crate::{SqlError, ast::*};
use query_structure::QueryValue;
use serde::Deserialize;
use std::fmt;

/// How values end up in the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamMode {
    /// Placeholders in the text, values in the parameter list.
    #[default]
    Bind,
    /// Values written into the text as literals.
    Inline,
}

pub type Result = std::result::Result<(), SqlError>;

/// A function travelling through the query AST, building the final query string
/// and gathering parameters sent to the database together with the query.
pub trait Visitor: Sized {
    /// Opening backtick character to surround identifiers, such as column and table names.
    const C_BACKTICK_OPEN: &'static str;
    /// Closing backtick character to surround identifiers, such as column and table names.
    const C_BACKTICK_CLOSE: &'static str;

    /// Converts the select into a query string and its parameters.
    fn build(select: Select, mode: ParamMode) -> std::result::Result<(String, Vec<QueryValue>), SqlError>;

    /// Write to the query.
    fn write<D: fmt::Display>(&mut self, s: D) -> Result;

    fn parameter_mode(&self) -> ParamMode;

    /// Adds a parameter and writes its placeholder.
    fn visit_parameterized(&mut self, value: QueryValue) -> Result;

    /// Writes a value directly into the query.
    fn visit_raw_value(&mut self, value: QueryValue) -> Result;

    /// Bound parameters are cast, inlined literals carry their own type.
    fn visit_typed_parameterized(&mut self, value: QueryValue, ty: &str) -> Result {
        match self.parameter_mode() {
            ParamMode::Inline => self.visit_parameterized(value),
            ParamMode::Bind => {
                self.write("cast(")?;
                self.visit_parameterized(value)?;
                self.write(format_args!(" as {ty})"))
            }
        }
    }

    fn surround_with<F>(&mut self, begin: &str, end: &str, f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        self.write(begin)?;
        f(self)?;
        self.write(end)
    }

    fn delimited_identifiers(&mut self, parts: &[&str]) -> Result {
        let len = parts.len();

        for (i, part) in parts.iter().enumerate() {
            self.surround_with_backticks(part)?;

            if i < (len - 1) {
                self.write(".")?;
            }
        }

        Ok(())
    }

    fn surround_with_backticks(&mut self, part: &str) -> Result {
        self.write(Self::C_BACKTICK_OPEN)?;
        self.write(part.replace(Self::C_BACKTICK_CLOSE, &format!("{0}{0}", Self::C_BACKTICK_CLOSE)))?;
        self.write(Self::C_BACKTICK_CLOSE)
    }

    fn visit_select(&mut self, select: Select) -> Result {
        self.write("select ")?;

        if select.columns.is_empty() {
            self.write("*")?;
        } else {
            self.visit_columns(select.columns)?;
        }

        if !select.tables.is_empty() {
            self.write(" from ")?;

            let len = select.tables.len();
            for (i, table) in select.tables.into_iter().enumerate() {
                self.visit_table(table)?;

                if i < (len - 1) {
                    self.write(", ")?;
                }
            }
        }

        for join in select.joins {
            self.visit_join(join)?;
        }

        if let Some(conditions) = select.conditions {
            if !conditions.is_empty() {
                self.write(" where ")?;
                self.visit_conditions(conditions)?;
            }
        }

        if !select.ordering.is_empty() {
            self.write(" order by ")?;
            self.visit_ordering(select.ordering)?;
        }

        if let Some(limit) = select.limit {
            self.write(" limit ")?;
            self.visit_expression(limit)?;
        }

        if let Some(offset) = select.offset {
            self.write(" offset ")?;
            self.visit_expression(offset)?;
        }

        Ok(())
    }

    fn visit_columns(&mut self, columns: Vec<Expression>) -> Result {
        let len = columns.len();

        for (i, column) in columns.into_iter().enumerate() {
            self.visit_expression(column)?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        Ok(())
    }

    fn visit_table(&mut self, table: Table) -> Result {
        match table.typ {
            TableType::Table { schema, name } => match schema {
                Some(schema) => self.delimited_identifiers(&[&schema, &name])?,
                None => self.delimited_identifiers(&[&name])?,
            },
            TableType::Query(select) => self.surround_with("(", ")", |s| s.visit_select(*select))?,
            TableType::Values(values) => self.surround_with("(", ")", |s| s.visit_values(values))?,
            TableType::Function { schema, name, args } => {
                match schema {
                    Some(schema) => self.delimited_identifiers(&[&schema, &name])?,
                    None => self.delimited_identifiers(&[&name])?,
                }

                self.surround_with("(", ")", |s| s.visit_columns(args))?;
            }
            TableType::Expression(expr) => self.visit_expression(*expr)?,
        }

        if let Some(alias) = table.alias {
            self.write(" as ")?;
            self.surround_with_backticks(&alias)?;

            if !table.column_aliases.is_empty() {
                let aliases = table.column_aliases;

                self.surround_with("(", ")", |s| {
                    let len = aliases.len();

                    for (i, alias) in aliases.iter().enumerate() {
                        s.surround_with_backticks(alias)?;

                        if i < (len - 1) {
                            s.write(", ")?;
                        }
                    }

                    Ok(())
                })?;
            }
        }

        Ok(())
    }

    fn visit_values(&mut self, values: Values) -> Result {
        self.write("values ")?;

        let len = values.rows.len();
        for (i, row) in values.rows.into_iter().enumerate() {
            self.surround_with("(", ")", |s| s.visit_columns(row.values))?;

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        Ok(())
    }

    fn visit_join(&mut self, join: Join) -> Result {
        let data = match join {
            Join::Inner(data) => {
                self.write(" inner join ")?;
                data
            }
            Join::Left(data) => {
                self.write(" left join ")?;
                data
            }
        };

        if data.lateral {
            self.write("lateral ")?;
        }

        self.visit_table(data.table)?;
        self.write(" on ")?;

        match data.conditions {
            ConditionTree::NoCondition => self.write("true"),
            conditions => self.visit_conditions(conditions),
        }
    }

    fn visit_expression(&mut self, value: Expression) -> Result {
        match value.kind {
            ExpressionKind::Column(column) => self.visit_column(*column)?,
            ExpressionKind::Asterisk(table) => match table {
                Some(table) => {
                    self.surround_with_backticks(&table)?;
                    self.write(".*")?;
                }
                None => self.write("*")?,
            },
            ExpressionKind::Parameterized(value) => self.visit_parameterized(value)?,
            ExpressionKind::TypedParameterized(value, ty) => self.visit_typed_parameterized(value, ty)?,
            ExpressionKind::RawValue(value) => self.visit_raw_value(value)?,
            ExpressionKind::Function(function) => self.visit_function(*function)?,
            ExpressionKind::ConditionTree(tree) => self.visit_conditions(tree)?,
            ExpressionKind::Compare(compare) => self.visit_compare(compare)?,
        }

        if let Some(alias) = value.alias {
            self.write(" as ")?;
            self.surround_with_backticks(&alias)?;
        }

        Ok(())
    }

    fn visit_column(&mut self, column: Column) -> Result {
        match column.table {
            Some(table) => self.delimited_identifiers(&[&table, &column.name]),
            None => self.delimited_identifiers(&[&column.name]),
        }
    }

    fn visit_conditions(&mut self, tree: ConditionTree) -> Result {
        match tree {
            ConditionTree::And(expressions) => self.surround_with("(", ")", |s| s.visit_junction(expressions, " and ")),
            ConditionTree::Or(expressions) => self.surround_with("(", ")", |s| s.visit_junction(expressions, " or ")),
            ConditionTree::Not(expression) => {
                let Expression { kind, alias } = *expression;

                self.surround_with("not(", ")", |s| match kind {
                    ExpressionKind::ConditionTree(ConditionTree::And(exprs)) => s.visit_junction(exprs, " and "),
                    ExpressionKind::ConditionTree(ConditionTree::Or(exprs)) => s.visit_junction(exprs, " or "),
                    kind => s.visit_expression(Expression { kind, alias }),
                })
            }
            ConditionTree::Single(expression) => self.visit_expression(*expression),
            ConditionTree::NoCondition => self.write("1=1"),
            ConditionTree::NegativeCondition => self.write("1=0"),
        }
    }

    fn visit_junction(&mut self, expressions: Vec<Expression>, separator: &str) -> Result {
        let len = expressions.len();

        for (i, expr) in expressions.into_iter().enumerate() {
            self.visit_expression(expr)?;

            if i < (len - 1) {
                self.write(separator)?;
            }
        }

        Ok(())
    }

    fn visit_compare(&mut self, compare: Compare) -> Result {
        match compare {
            Compare::Equals(left, right) => self.visit_binary(*left, " = ", *right),
            Compare::NotEquals(left, right) => self.visit_binary(*left, " <> ", *right),
            Compare::LessThan(left, right) => self.visit_binary(*left, " < ", *right),
            Compare::LessThanOrEquals(left, right) => self.visit_binary(*left, " <= ", *right),
            Compare::GreaterThan(left, right) => self.visit_binary(*left, " > ", *right),
            Compare::GreaterThanOrEquals(left, right) => self.visit_binary(*left, " >= ", *right),
            Compare::In(_, selection) if selection.is_empty() => self.write("1=0"),
            Compare::In(left, selection) => {
                self.visit_expression(*left)?;
                self.write(" in ")?;
                self.surround_with("(", ")", |s| s.visit_columns(selection))
            }
            Compare::Null(expr) => {
                self.visit_expression(*expr)?;
                self.write(" is null")
            }
            Compare::NotNull(expr) => {
                self.visit_expression(*expr)?;
                self.write(" is not null")
            }
            Compare::Any(value, array) => {
                self.visit_expression(*value)?;
                self.write(" = any")?;
                self.surround_with("(", ")", |s| s.visit_expression(*array))
            }
            Compare::Exists(select) => self.surround_with("exists (", ")", |s| s.visit_select(*select)),
            Compare::NotExists(select) => self.surround_with("not exists (", ")", |s| s.visit_select(*select)),
        }
    }

    fn visit_binary(&mut self, left: Expression, operator: &str, right: Expression) -> Result {
        self.visit_expression(left)?;
        self.write(operator)?;
        self.visit_expression(right)
    }

    fn visit_function(&mut self, function: Function) -> Result {
        match function {
            Function::Count { expr: None, .. } => self.write("count(*)"),
            Function::Count {
                expr: Some(expr),
                distinct,
            } => self.surround_with("count(", ")", |s| {
                if distinct {
                    s.write("distinct ")?;
                }
                s.visit_expression(*expr)
            }),
            Function::Sum(expr) => self.surround_with("sum(", ")", |s| s.visit_expression(*expr)),
            Function::Avg(expr) => self.surround_with("avg(", ")", |s| s.visit_expression(*expr)),
            Function::Min(expr) => self.surround_with("min(", ")", |s| s.visit_expression(*expr)),
            Function::Max(expr) => self.surround_with("max(", ")", |s| s.visit_expression(*expr)),
            Function::StringAgg {
                expr,
                separator,
                distinct,
            } => self.surround_with("string_agg(", ")", |s| {
                if distinct {
                    s.write("distinct ")?;
                }
                s.visit_expression(*expr)?;
                s.write(", ")?;
                s.visit_expression(*separator)
            }),
            Function::Cast { expr, ty } => self.surround_with("cast(", ")", |s| {
                s.visit_expression(*expr)?;
                s.write(" as ")?;
                s.write(ty)
            }),
            Function::Named { name, args } => {
                self.write(name)?;
                self.surround_with("(", ")", |s| s.visit_columns(args))
            }
            Function::Unnest(expr) => self.surround_with("unnest(", ")", |s| s.visit_expression(*expr)),
        }
    }

    fn visit_ordering(&mut self, ordering: Vec<OrderDefinition>) -> Result {
        let len = ordering.len();

        for (i, (value, order)) in ordering.into_iter().enumerate() {
            self.visit_expression(value)?;

            match order {
                Order::Asc => self.write(" asc")?,
                Order::Desc => self.write(" desc")?,
            }

            if i < (len - 1) {
                self.write(", ")?;
            }
        }

        Ok(())
    }
}
