//! A small SQL abstract syntax tree, rendered by a [`Visitor`](crate::visitor::Visitor).
mod column;
mod compare;
mod conditions;
mod expression;
mod function;
mod join;
mod ordering;
mod select;
mod table;
mod values;

pub use column::*;
pub use compare::*;
pub use conditions::*;
pub use expression::*;
pub use function::*;
pub use join::*;
pub use ordering::*;
pub use select::*;
pub use table::*;
pub use values::*;
