use super::*;
use query_structure::TableRef;

#[derive(Clone, Debug, PartialEq)]
pub enum TableType {
    Table { schema: Option<String>, name: String },
    Query(Box<Select>),
    Values(Values),
    /// A table-valued function: `"name"(args)`.
    Function {
        schema: Option<String>,
        name: String,
        args: Vec<Expression>,
    },
    /// A set-returning expression, e.g. `unnest(...)`.
    Expression(Box<Expression>),
}

/// A table definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub typ: TableType,
    pub alias: Option<String>,
    /// Names given to the columns of a derived table: `as "t1"("a", "b")`.
    pub column_aliases: Vec<String>,
}

impl Table {
    pub fn new(typ: TableType) -> Self {
        Self {
            typ,
            alias: None,
            column_aliases: Vec::new(),
        }
    }

    /// A table-valued function called with the given arguments.
    pub fn function(table: &TableRef, suffix: &str, args: Vec<Expression>) -> Self {
        Table::new(TableType::Function {
            schema: table.schema().map(ToOwned::to_owned),
            name: format!("{}{}", table.name(), suffix),
            args,
        })
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn column_aliases<T>(mut self, aliases: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<String>,
    {
        self.column_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Puts the table into the given schema, unless it already has one.
    pub fn default_schema(mut self, default: Option<&str>) -> Self {
        if let (TableType::Table { schema, .. } | TableType::Function { schema, .. }, Some(default)) =
            (&mut self.typ, default)
        {
            schema.get_or_insert_with(|| default.to_owned());
        }

        self
    }
}

impl From<&TableRef> for Table {
    fn from(table: &TableRef) -> Self {
        Table::new(TableType::Table {
            schema: table.schema().map(ToOwned::to_owned),
            name: table.name().to_owned(),
        })
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Table::new(TableType::Table {
            schema: None,
            name: name.to_owned(),
        })
    }
}

impl From<Select> for Table {
    fn from(select: Select) -> Self {
        Table::new(TableType::Query(Box::new(select)))
    }
}

impl From<Values> for Table {
    fn from(values: Values) -> Self {
        Table::new(TableType::Values(values))
    }
}

impl From<Function> for Table {
    fn from(function: Function) -> Self {
        Table::new(TableType::Expression(Box::new(function.into())))
    }
}
