use super::{Expression, ExpressionKind};

/// A column, optionally qualified by the table alias it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub table: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
        }
    }

    /// Sets the table the column is read from.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

impl<T, C> From<(T, C)> for Column
where
    T: Into<String>,
    C: Into<String>,
{
    fn from((table, name): (T, C)) -> Self {
        Column::new(name).table(table)
    }
}

impl From<Column> for Expression {
    fn from(column: Column) -> Self {
        Expression::new(ExpressionKind::Column(Box::new(column)))
    }
}
