use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

pub type OrderDefinition = (Expression, Order);

/// An item that can be used in the `order by` statement.
pub trait Orderable: Sized {
    fn order(self, order: Order) -> OrderDefinition;

    fn ascend(self) -> OrderDefinition {
        self.order(Order::Asc)
    }

    fn descend(self) -> OrderDefinition {
        self.order(Order::Desc)
    }
}

impl<T> Orderable for T
where
    T: Into<Expression>,
{
    fn order(self, order: Order) -> OrderDefinition {
        (self.into(), order)
    }
}
