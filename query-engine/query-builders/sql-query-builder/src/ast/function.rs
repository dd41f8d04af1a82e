use super::*;

/// SQL functions used by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// `count(*)`, `count(expr)` or `count(distinct expr)`.
    Count {
        expr: Option<Box<Expression>>,
        distinct: bool,
    },
    Sum(Box<Expression>),
    Avg(Box<Expression>),
    Min(Box<Expression>),
    Max(Box<Expression>),
    StringAgg {
        expr: Box<Expression>,
        separator: Box<Expression>,
        distinct: bool,
    },
    /// `cast(expr as ty)`
    Cast {
        expr: Box<Expression>,
        ty: &'static str,
    },
    /// Any other function, rendered as `name(args)`.
    Named {
        name: &'static str,
        args: Vec<Expression>,
    },
    Unnest(Box<Expression>),
}

impl From<Function> for Expression {
    fn from(f: Function) -> Self {
        Expression::new(ExpressionKind::Function(Box::new(f)))
    }
}

pub fn count_all() -> Function {
    Function::Count {
        expr: None,
        distinct: false,
    }
}

pub fn count(expr: impl Into<Expression>, distinct: bool) -> Function {
    Function::Count {
        expr: Some(Box::new(expr.into())),
        distinct,
    }
}

pub fn sum(expr: impl Into<Expression>) -> Function {
    Function::Sum(Box::new(expr.into()))
}

pub fn avg(expr: impl Into<Expression>) -> Function {
    Function::Avg(Box::new(expr.into()))
}

pub fn min(expr: impl Into<Expression>) -> Function {
    Function::Min(Box::new(expr.into()))
}

pub fn max(expr: impl Into<Expression>) -> Function {
    Function::Max(Box::new(expr.into()))
}

pub fn string_agg(expr: impl Into<Expression>, separator: impl Into<Expression>, distinct: bool) -> Function {
    Function::StringAgg {
        expr: Box::new(expr.into()),
        separator: Box::new(separator.into()),
        distinct,
    }
}

pub fn cast(expr: impl Into<Expression>, ty: &'static str) -> Function {
    Function::Cast {
        expr: Box::new(expr.into()),
        ty,
    }
}

pub fn function(name: &'static str, args: Vec<Expression>) -> Function {
    Function::Named { name, args }
}

pub fn unnest(expr: impl Into<Expression>) -> Function {
    Function::Unnest(Box::new(expr.into()))
}
