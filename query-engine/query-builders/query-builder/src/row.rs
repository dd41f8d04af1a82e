use query_structure::QueryValue;
use std::collections::HashMap;

/// One result row, keyed by generated column alias.
pub type FlatRow = HashMap<String, QueryValue>;

/// How a single response field is read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAssembler {
    /// The value of one aliased column.
    Column(String),
    /// A nested object read from the same row.
    Object(RowAssembler),
    /// Parent-side key values of a to-many relation, as `(column, alias)` pairs.
    /// Yields an object keyed by column, ready to be used as batch join criteria.
    JoinKey(Vec<(String, String)>),
}

impl FieldAssembler {
    fn assemble(&self, row: &FlatRow) -> QueryValue {
        match self {
            FieldAssembler::Column(alias) => row.get(alias).cloned().unwrap_or(QueryValue::Null),
            FieldAssembler::Object(assembler) => assembler.assemble(row).unwrap_or(QueryValue::Null),
            FieldAssembler::JoinKey(columns) => QueryValue::Object(
                columns
                    .iter()
                    .map(|(column, alias)| (column.clone(), row.get(alias).cloned().unwrap_or(QueryValue::Null)))
                    .collect(),
            ),
        }
    }
}

/// Rebuilds one response object from a flat row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowAssembler {
    fields: Vec<(String, FieldAssembler)>,
    check_null: Option<String>,
    null_object: Option<QueryValue>,
}

impl RowAssembler {
    pub fn new(fields: Vec<(String, FieldAssembler)>, check_null: Option<String>) -> Self {
        Self {
            fields,
            check_null,
            null_object: None,
        }
    }

    /// Returns `value` instead of nothing when the object is absent from a row.
    pub fn with_null_object(mut self, value: QueryValue) -> Self {
        self.null_object = Some(value);
        self
    }

    pub fn fields(&self) -> &[(String, FieldAssembler)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldAssembler> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// The alias whose nullness means "no object in this row".
    pub fn check_null_alias(&self) -> Option<&str> {
        self.check_null.as_deref()
    }

    /// Every column alias read by this assembler and its children.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases = Vec::new();

        for (_, field) in &self.fields {
            match field {
                FieldAssembler::Column(alias) => aliases.push(alias.as_str()),
                FieldAssembler::Object(child) => aliases.extend(child.aliases()),
                FieldAssembler::JoinKey(columns) => aliases.extend(columns.iter().map(|(_, a)| a.as_str())),
            }
        }

        aliases
    }

    pub fn assemble(&self, row: &FlatRow) -> Option<QueryValue> {
        if let Some(alias) = &self.check_null {
            if row.get(alias).is_none_or(QueryValue::is_null) {
                return self.null_object.clone();
            }
        }

        let pairs = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.assemble(row)))
            .collect();

        Some(QueryValue::Object(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, QueryValue)]) -> FlatRow {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn beer_assembler() -> RowAssembler {
        let brewery = RowAssembler::new(
            vec![("name".into(), FieldAssembler::Column("x3".into()))],
            Some("x4".into()),
        );

        RowAssembler::new(
            vec![
                ("name".into(), FieldAssembler::Column("x1".into())),
                ("brewery".into(), FieldAssembler::Object(brewery)),
            ],
            Some("x2".into()),
        )
    }

    #[test]
    fn nested_objects_are_read_from_the_same_row() {
        let row = row(&[
            ("x1", "Pilsener".into()),
            ("x2", 1.into()),
            ("x3", "Heineken".into()),
            ("x4", 7.into()),
        ]);

        assert_eq!(
            beer_assembler().assemble(&row),
            Some(QueryValue::Object(vec![
                ("name".into(), "Pilsener".into()),
                (
                    "brewery".into(),
                    QueryValue::Object(vec![("name".into(), "Heineken".into())])
                ),
            ]))
        );
    }

    #[test]
    fn absent_children_become_null() {
        let row = row(&[
            ("x1", "Pilsener".into()),
            ("x2", 1.into()),
            ("x3", QueryValue::Null),
            ("x4", QueryValue::Null),
        ]);

        assert_eq!(beer_assembler().assemble(&row).unwrap().get("brewery"), Some(&QueryValue::Null));
    }

    #[test]
    fn null_object_sentinel_replaces_absent_objects() {
        let assembler = beer_assembler().with_null_object(QueryValue::Object(vec![]));

        assert_eq!(assembler.assemble(&row(&[])), Some(QueryValue::Object(vec![])));
        assert_eq!(beer_assembler().assemble(&row(&[])), None);
    }

    #[test]
    fn join_keys_are_exposed_by_column() {
        let assembler = RowAssembler::new(
            vec![(
                "$join:beers".into(),
                FieldAssembler::JoinKey(vec![("id".into(), "x5".into())]),
            )],
            None,
        );

        assert_eq!(
            assembler.assemble(&row(&[("x5", 3.into())])),
            Some(QueryValue::Object(vec![(
                "$join:beers".into(),
                QueryValue::Object(vec![("id".into(), 3.into())])
            )]))
        );
        assert_eq!(assembler.aliases(), vec!["x5"]);
    }
}
