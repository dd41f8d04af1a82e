use crate::Filter;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    /// String concatenation of the aggregated values.
    Join,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Join => "JOIN",
        };

        f.write_str(name)
    }
}

/// The type an aggregated number is cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    Int,
    Float,
}

/// One aggregate value in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFieldRequest {
    pub alias: String,
    pub function: AggregateFunction,
    /// `None` only for counting rows.
    pub field: Option<String>,
    pub result_type: Option<NumericType>,
    pub distinct: bool,
    pub separator: Option<String>,
}

impl AggregateFieldRequest {
    pub fn new(alias: impl Into<String>, function: AggregateFunction, field: Option<&str>) -> Self {
        Self {
            alias: alias.into(),
            function,
            field: field.map(ToOwned::to_owned),
            result_type: None,
            distinct: false,
            separator: None,
        }
    }

    pub fn count(alias: impl Into<String>) -> Self {
        Self::new(alias, AggregateFunction::Count, None)
    }

    pub fn sum(alias: impl Into<String>, field: &str) -> Self {
        Self::new(alias, AggregateFunction::Sum, Some(field))
    }

    pub fn avg(alias: impl Into<String>, field: &str) -> Self {
        Self::new(alias, AggregateFunction::Avg, Some(field))
    }

    pub fn min(alias: impl Into<String>, field: &str) -> Self {
        Self::new(alias, AggregateFunction::Min, Some(field))
    }

    pub fn max(alias: impl Into<String>, field: &str) -> Self {
        Self::new(alias, AggregateFunction::Max, Some(field))
    }

    pub fn join(alias: impl Into<String>, field: &str, separator: impl Into<String>) -> Self {
        let mut req = Self::new(alias, AggregateFunction::Join, Some(field));
        req.separator = Some(separator.into());
        req
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn as_type(mut self, result_type: NumericType) -> Self {
        self.result_type = Some(result_type);
        self
    }
}

/// Aggregates over the entities reachable through one relation field.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateObjectRequest {
    pub field: String,
    pub alias: String,
    pub aggregates: Vec<AggregateFieldRequest>,
    pub filters: Vec<Filter>,
}

impl AggregateObjectRequest {
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();

        Self {
            alias: field.clone(),
            field,
            aggregates: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn aggregate(mut self, aggregate: AggregateFieldRequest) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}
