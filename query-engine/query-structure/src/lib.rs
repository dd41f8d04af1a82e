mod aggregate;
mod error;
mod field;
mod join_criteria;
mod order_by;
mod relation;
mod request;
mod schema;

pub mod filter;

pub use aggregate::*;
pub use error::*;
pub use field::*;
pub use filter::*;
pub use join_criteria::*;
pub use order_by::*;
pub use relation::*;
pub use request::*;
pub use schema::*;

pub use query_value::{KeyMap, QueryValue};

pub type Result<T> = std::result::Result<T, DomainError>;
