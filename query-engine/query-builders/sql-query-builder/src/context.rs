use std::sync::{self, atomic::AtomicUsize};

use query_structure::{ContextCriteria, Entity, Schema, TableRef};
use serde::Deserialize;

use crate::{
    alias::Alias,
    ast::{Table, val},
    geometry::{CrsRegistry, GeometryReader},
    visitor::ParamMode,
};

/// Knobs of the compiler that do not depend on the request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerSettings {
    pub param_mode: ParamMode,
    /// Schema for tables whose metadata does not name one.
    pub default_schema: Option<String>,
    /// Appended to the table name to form the table function queried under context criteria.
    pub context_table_suffix: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            param_mode: ParamMode::Bind,
            default_schema: None,
            context_table_suffix: "_ctx".to_owned(),
        }
    }
}

/// Per-request compilation state: the metadata, the collaborators and the alias counters.
///
/// One context is created for every top-level request and dropped with it.
pub struct Context<'a> {
    schema: &'a Schema,
    settings: &'a CompilerSettings,
    geometry_reader: &'a dyn GeometryReader,
    crs_registry: &'a dyn CrsRegistry,

    table_alias_counter: AtomicUsize,
    field_alias_counter: AtomicUsize,
}

impl<'a> Context<'a> {
    pub fn new(
        schema: &'a Schema,
        settings: &'a CompilerSettings,
        geometry_reader: &'a dyn GeometryReader,
        crs_registry: &'a dyn CrsRegistry,
    ) -> Self {
        Context {
            schema,
            settings,
            geometry_reader,
            crs_registry,

            table_alias_counter: Default::default(),
            field_alias_counter: Default::default(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn settings(&self) -> &'a CompilerSettings {
        self.settings
    }

    pub(crate) fn geometry_reader(&self) -> &'a dyn GeometryReader {
        self.geometry_reader
    }

    pub(crate) fn crs_registry(&self) -> &'a dyn CrsRegistry {
        self.crs_registry
    }

    pub(crate) fn next_table_alias(&self) -> Alias {
        Alias::Table(self.table_alias_counter.fetch_add(1, sync::atomic::Ordering::SeqCst) + 1)
    }

    pub(crate) fn next_field_alias(&self) -> Alias {
        Alias::Field(self.field_alias_counter.fetch_add(1, sync::atomic::Ordering::SeqCst) + 1)
    }

    /// A table from the metadata, placed in the default schema.
    pub(crate) fn table(&self, table: &TableRef) -> Table {
        Table::from(table).default_schema(self.settings.default_schema.as_deref())
    }

    /// The table rows of `entity` are read from. Context criteria select a table function instead.
    pub(crate) fn entity_table(&self, entity: &Entity, context: &[ContextCriteria]) -> Table {
        if context.is_empty() {
            return self.table(&entity.table);
        }

        let args = context.iter().map(|criteria| val(criteria.value.clone())).collect();

        Table::function(&entity.table, &self.settings.context_table_suffix, args)
            .default_schema(self.settings.default_schema.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{StaticCrsRegistry, WktGeometryReader};

    #[test]
    fn aliases_are_numbered_from_one_per_kind() {
        let schema = Schema::default();
        let settings = CompilerSettings::default();
        let registry = StaticCrsRegistry::default();
        let ctx = Context::new(&schema, &settings, &WktGeometryReader, &registry);

        assert_eq!(ctx.next_table_alias(), Alias::Table(1));
        assert_eq!(ctx.next_field_alias(), Alias::Field(1));
        assert_eq!(ctx.next_table_alias(), Alias::Table(2));
        assert_eq!(ctx.next_field_alias(), Alias::Field(2));
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: CompilerSettings = serde_json::from_str(r#"{ "paramMode": "inline" }"#).unwrap();

        assert_eq!(settings.param_mode, ParamMode::Inline);
        assert_eq!(settings.context_table_suffix, "_ctx");
        assert_eq!(settings.default_schema, None);
    }
}
