pub mod ast;
pub mod geometry;
pub mod visitor;

mod aggregate;
mod alias;
mod batch;
mod context;
mod error;
mod filter;
mod join_utils;
mod select;
mod spatial;

use std::marker::PhantomData;

use query_builder::{CompiledBatch, CompiledSelect, DbQuery, QueryBuilder};
use query_structure::{BatchRequest, CollectionRequest, ObjectRequest, Schema};

pub use context::{CompilerSettings, Context};
pub use error::{ErrorKind, SqlError};
pub use geometry::{CrsRegistry, Geometry, GeometryFormat, GeometryKind, GeometryReader, StaticCrsRegistry, WktGeometryReader};
pub use visitor::{ParamMode, Postgres, Visitor};

use ast::Select;
use select::SelectBuilder;

pub type Result<T> = std::result::Result<T, SqlError>;

/// Compiles requests against `schema` into single SQL queries rendered by `V`.
///
/// Every request is compiled with a fresh [`Context`], so aliases restart at `t1` and `x1`.
pub struct SqlQueryBuilder<'a, V> {
    schema: &'a Schema,
    settings: CompilerSettings,
    geometry_reader: Box<dyn GeometryReader>,
    crs_registry: Box<dyn CrsRegistry>,
    phantom: PhantomData<fn(V)>,
}

impl<'a, V> SqlQueryBuilder<'a, V> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            settings: CompilerSettings::default(),
            geometry_reader: Box::new(WktGeometryReader),
            crs_registry: Box::new(StaticCrsRegistry::default()),
            phantom: PhantomData,
        }
    }

    pub fn with_settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_geometry_reader(mut self, reader: impl GeometryReader + 'static) -> Self {
        self.geometry_reader = Box::new(reader);
        self
    }

    pub fn with_crs_registry(mut self, registry: impl CrsRegistry + 'static) -> Self {
        self.crs_registry = Box::new(registry);
        self
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    fn context(&self) -> Context<'_> {
        Context::new(
            self.schema,
            &self.settings,
            self.geometry_reader.as_ref(),
            self.crs_registry.as_ref(),
        )
    }

    fn convert_query(&self, select: Select) -> Result<DbQuery>
    where
        V: Visitor,
    {
        let (sql, params) = V::build(select, self.settings.param_mode)?;

        tracing::debug!(%sql, params = params.len(), "compiled query");
        Ok(DbQuery::new(sql, params))
    }

    pub fn compile_collection(&self, request: &CollectionRequest) -> Result<CompiledSelect>
    where
        V: Visitor,
    {
        let ctx = self.context();
        let (select, assembler) = SelectBuilder::new(&ctx).build_collection(request)?;

        Ok(CompiledSelect {
            query: self.convert_query(select)?,
            assembler,
        })
    }

    pub fn compile_object(&self, request: &ObjectRequest) -> Result<CompiledSelect>
    where
        V: Visitor,
    {
        let ctx = self.context();
        let (select, assembler) = SelectBuilder::new(&ctx).build_object(request)?;

        Ok(CompiledSelect {
            query: self.convert_query(select)?,
            assembler,
        })
    }

    pub fn compile_batch(&self, request: &BatchRequest) -> Result<CompiledBatch>
    where
        V: Visitor,
    {
        let ctx = self.context();
        let (select, assembler, grouping) = batch::build_batch(&ctx, request)?;

        Ok(CompiledBatch {
            query: self.convert_query(select)?,
            assembler,
            grouping,
        })
    }
}

impl<V: Visitor> QueryBuilder for SqlQueryBuilder<'_, V> {
    fn build_collection(
        &self,
        request: &CollectionRequest,
    ) -> std::result::Result<CompiledSelect, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.compile_collection(request)?)
    }

    fn build_object(
        &self,
        request: &ObjectRequest,
    ) -> std::result::Result<CompiledSelect, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.compile_object(request)?)
    }

    fn build_batch(&self, request: &BatchRequest) -> std::result::Result<CompiledBatch, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.compile_batch(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_structure::{Entity, ScalarField, ScalarType, TableRef};
    use tracing_test::traced_test;

    fn hops() -> Schema {
        let hop = Entity::new("Hop", TableRef::new("hop"))
            .with_key("name")
            .with_field(ScalarField::new("name", "name", ScalarType::String));

        Schema::new([hop]).unwrap()
    }

    #[test]
    #[traced_test]
    fn compiled_queries_are_logged() {
        let schema = hops();
        let builder = SqlQueryBuilder::<Postgres>::new(&schema);

        let compiled = builder.build_object(&ObjectRequest::new("Hop").select("name")).unwrap();

        assert_eq!(compiled.query.sql, r#"select "t1"."name" as "x1" from "hop" as "t1""#);
        assert!(logs_contain("compiled query"));
    }

    #[test]
    fn trait_errors_keep_their_type() {
        let schema = hops();
        let builder = SqlQueryBuilder::<Postgres>::new(&schema);

        let err = builder.build_object(&ObjectRequest::new("Malt").select("name")).unwrap_err();

        assert!(matches!(err.downcast_ref::<SqlError>(), Some(SqlError::Domain(_))));
    }
}
