use super::*;

/// For modeling comparison expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Compare {
    /// `left = right`
    Equals(Box<Expression>, Box<Expression>),
    /// `left <> right`
    NotEquals(Box<Expression>, Box<Expression>),
    /// `left < right`
    LessThan(Box<Expression>, Box<Expression>),
    /// `left <= right`
    LessThanOrEquals(Box<Expression>, Box<Expression>),
    /// `left > right`
    GreaterThan(Box<Expression>, Box<Expression>),
    /// `left >= right`
    GreaterThanOrEquals(Box<Expression>, Box<Expression>),
    /// `left in (a, b, ...)`
    In(Box<Expression>, Vec<Expression>),
    /// `expr is null`
    Null(Box<Expression>),
    /// `expr is not null`
    NotNull(Box<Expression>),
    /// `value = any(array)`
    Any(Box<Expression>, Box<Expression>),
    /// `exists (select ...)`
    Exists(Box<Select>),
    /// `not exists (select ...)`
    NotExists(Box<Select>),
}

impl From<Compare> for Expression {
    fn from(cmp: Compare) -> Self {
        Expression::new(ExpressionKind::Compare(cmp))
    }
}

pub fn exists(select: Select) -> Compare {
    Compare::Exists(Box::new(select))
}

pub fn not_exists(select: Select) -> Compare {
    Compare::NotExists(Box::new(select))
}

/// An item that can be compared against other values in the database.
pub trait Comparable {
    fn equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>;

    fn not_equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>;

    fn less_than<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>;

    fn less_than_or_equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>;

    fn greater_than<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>;

    fn greater_than_or_equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>;

    fn in_selection<T>(self, selection: Vec<T>) -> Compare
    where
        T: Into<Expression>;

    fn is_null(self) -> Compare;

    fn is_not_null(self) -> Compare;

    /// Compares against every element of an array column.
    fn equals_any<T>(self, array: T) -> Compare
    where
        T: Into<Expression>;
}

impl<U> Comparable for U
where
    U: Into<Expression>,
{
    fn equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::Equals(Box::new(self.into()), Box::new(comparison.into()))
    }

    fn not_equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::NotEquals(Box::new(self.into()), Box::new(comparison.into()))
    }

    fn less_than<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::LessThan(Box::new(self.into()), Box::new(comparison.into()))
    }

    fn less_than_or_equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::LessThanOrEquals(Box::new(self.into()), Box::new(comparison.into()))
    }

    fn greater_than<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::GreaterThan(Box::new(self.into()), Box::new(comparison.into()))
    }

    fn greater_than_or_equals<T>(self, comparison: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::GreaterThanOrEquals(Box::new(self.into()), Box::new(comparison.into()))
    }

    fn in_selection<T>(self, selection: Vec<T>) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::In(Box::new(self.into()), selection.into_iter().map(Into::into).collect())
    }

    fn is_null(self) -> Compare {
        Compare::Null(Box::new(self.into()))
    }

    fn is_not_null(self) -> Compare {
        Compare::NotNull(Box::new(self.into()))
    }

    fn equals_any<T>(self, array: T) -> Compare
    where
        T: Into<Expression>,
    {
        Compare::Any(Box::new(self.into()), Box::new(array.into()))
    }
}
