mod grouping;
mod row;

pub use grouping::{BatchGrouping, GroupedRows};
pub use row::{FieldAssembler, FlatRow, RowAssembler};

use query_structure::{BatchRequest, CollectionRequest, ObjectRequest, QueryValue};
use serde::Serialize;
use std::fmt;

/// Compiles request trees into backend queries.
pub trait QueryBuilder {
    /// A root request for a set of objects.
    fn build_collection(
        &self,
        request: &CollectionRequest,
    ) -> Result<CompiledSelect, Box<dyn std::error::Error + Send + Sync>>;

    /// A root request for objects of one entity, possibly fetched by key.
    fn build_object(&self, request: &ObjectRequest) -> Result<CompiledSelect, Box<dyn std::error::Error + Send + Sync>>;

    /// One relation for many parents at once.
    fn build_batch(&self, request: &BatchRequest) -> Result<CompiledBatch, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbQuery {
    pub sql: String,
    pub params: Vec<QueryValue>,
}

impl DbQuery {
    pub fn new(sql: String, params: Vec<QueryValue>) -> Self {
        Self { sql, params }
    }

    pub fn params(&self) -> &[QueryValue] {
        &self.params
    }
}

impl fmt::Display for DbQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// A query together with the assembler turning its rows into response objects.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSelect {
    pub query: DbQuery,
    pub assembler: RowAssembler,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledBatch {
    pub query: DbQuery,
    pub assembler: RowAssembler,
    pub grouping: BatchGrouping,
}

impl CompiledBatch {
    /// Groups the assembled child objects by parent key.
    pub fn group<I>(&self, rows: I) -> GroupedRows
    where
        I: IntoIterator<Item = FlatRow>,
    {
        self.grouping.group(&self.assembler, rows)
    }
}
