use super::*;

/// Tree structures and leaves for condition building.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum ConditionTree {
    /// `(a and b and ...)`
    And(Vec<Expression>),
    /// `(a or b or ...)`
    Or(Vec<Expression>),
    /// `not(a)`
    Not(Box<Expression>),
    /// A single expression leaf.
    Single(Box<Expression>),
    /// A leaf that does nothing to the condition, `1=1`.
    #[default]
    NoCondition,
    /// A leaf that cancels the condition, `1=0`.
    NegativeCondition,
}

impl ConditionTree {
    pub fn single(expression: impl Into<Expression>) -> Self {
        ConditionTree::Single(Box::new(expression.into()))
    }

    /// Conjunction of all conditions. Trivial members are dropped.
    pub fn all(conditions: impl IntoIterator<Item = ConditionTree>) -> Self {
        let mut exprs = Vec::new();

        for condition in conditions {
            match condition {
                ConditionTree::NoCondition => (),
                ConditionTree::NegativeCondition => return ConditionTree::NegativeCondition,
                ConditionTree::And(inner) => exprs.extend(inner),
                other => exprs.push(Expression::from(other)),
            }
        }

        match exprs.len() {
            0 => ConditionTree::NoCondition,
            1 => exprs.pop().map(ConditionTree::from).unwrap_or_default(),
            _ => ConditionTree::And(exprs),
        }
    }

    /// Disjunction of all conditions. Trivial members are dropped.
    pub fn any(conditions: impl IntoIterator<Item = ConditionTree>) -> Self {
        let mut exprs = Vec::new();

        for condition in conditions {
            match condition {
                ConditionTree::NegativeCondition => (),
                ConditionTree::NoCondition => return ConditionTree::NoCondition,
                ConditionTree::Or(inner) => exprs.extend(inner),
                other => exprs.push(Expression::from(other)),
            }
        }

        match exprs.len() {
            0 => ConditionTree::NegativeCondition,
            1 => exprs.pop().map(ConditionTree::from).unwrap_or(ConditionTree::NegativeCondition),
            _ => ConditionTree::Or(exprs),
        }
    }

    pub fn and(self, other: impl Into<ConditionTree>) -> Self {
        ConditionTree::all([self, other.into()])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            ConditionTree::NoCondition => ConditionTree::NegativeCondition,
            ConditionTree::NegativeCondition => ConditionTree::NoCondition,
            ConditionTree::Not(inner) => ConditionTree::from(*inner),
            other => ConditionTree::Not(Box::new(Expression::from(other))),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionTree::NoCondition)
    }
}

impl From<ConditionTree> for Expression {
    fn from(ct: ConditionTree) -> Self {
        Expression::new(ExpressionKind::ConditionTree(ct))
    }
}

impl From<Expression> for ConditionTree {
    fn from(expr: Expression) -> Self {
        match expr.kind {
            ExpressionKind::ConditionTree(ct) => ct,
            _ => ConditionTree::single(expr),
        }
    }
}

impl From<Compare> for ConditionTree {
    fn from(cmp: Compare) -> Self {
        ConditionTree::single(cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(col: &str) -> ConditionTree {
        Column::from(("t1", col)).equals(val(1)).into()
    }

    #[test]
    fn trivial_members_are_dropped() {
        assert_eq!(ConditionTree::all([ConditionTree::NoCondition, eq("a")]), eq("a"));
        assert_eq!(
            ConditionTree::all([eq("a"), ConditionTree::NegativeCondition]),
            ConditionTree::NegativeCondition
        );
        assert_eq!(ConditionTree::any(Vec::new()), ConditionTree::NegativeCondition);
        assert_eq!(ConditionTree::all(Vec::new()), ConditionTree::NoCondition);
    }

    #[test]
    fn nested_conjunctions_are_flattened() {
        let nested = ConditionTree::all([eq("a"), eq("b")]).and(eq("c"));

        assert!(matches!(nested, ConditionTree::And(exprs) if exprs.len() == 3));
    }

    #[test]
    fn double_negation_cancels_out() {
        assert_eq!(eq("a").not().not(), eq("a"));
    }
}
