use super::*;
use query_structure::QueryValue;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Column(Box<Column>),
    /// `"t1".*`, or `*` without a table.
    Asterisk(Option<String>),
    /// A value sent as a query parameter.
    Parameterized(QueryValue),
    /// A parameter whose type cannot be inferred from where it is used, e.g. a `values` cell.
    TypedParameterized(QueryValue, &'static str),
    /// A value always written into the query text.
    RawValue(QueryValue),
    Function(Box<Function>),
    ConditionTree(ConditionTree),
    Compare(Compare),
}

/// An expression that can be selected, compared or aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub alias: Option<String>,
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self { kind, alias: None }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn is_asterisk(&self) -> bool {
        matches!(self.kind, ExpressionKind::Asterisk(_))
    }
}

/// A parameterized value.
pub fn val(value: impl Into<QueryValue>) -> Expression {
    Expression::new(ExpressionKind::Parameterized(value.into()))
}

/// A parameterized value of the given database type.
pub fn typed_val(value: impl Into<QueryValue>, ty: &'static str) -> Expression {
    Expression::new(ExpressionKind::TypedParameterized(value.into(), ty))
}

/// A value rendered inline, e.g. the `1` of `select 1`.
pub fn raw(value: impl Into<QueryValue>) -> Expression {
    Expression::new(ExpressionKind::RawValue(value.into()))
}

/// All columns of the given table alias.
pub fn asterisk(table: impl Into<String>) -> Expression {
    Expression::new(ExpressionKind::Asterisk(Some(table.into())))
}

impl From<QueryValue> for Expression {
    fn from(value: QueryValue) -> Self {
        val(value)
    }
}
