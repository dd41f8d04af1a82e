use crate::{DomainError, TableRef};
use serde::Deserialize;

/// How two entities are linked. Exactly one topology per relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// Foreign key columns in the owning table referencing the target.
    JoinColumns(Vec<JoinColumn>),
    /// A junction table referencing both sides.
    JoinTable(JoinTable),
    /// The relation is owned by the named field of the target entity.
    MappedBy(String),
}

/// A column referencing a column of another table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinColumn {
    pub name: String,
    #[serde(flatten)]
    pub referenced: ColumnRef,
}

impl JoinColumn {
    pub fn new(name: impl Into<String>, referenced: ColumnRef) -> Self {
        Self {
            name: name.into(),
            referenced,
        }
    }
}

/// The referenced side of a join column: either a raw column, or a field whose column is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRef {
    ReferencedColumn(String),
    ReferencedField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTable {
    pub table: TableRef,
    /// Junction columns referencing the owning entity.
    pub join_columns: Vec<JoinColumn>,
    /// Junction columns referencing the target entity.
    pub inverse_join_columns: Vec<JoinColumn>,
}

/// Relation metadata as it is configured, before the topology is checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationConfig {
    #[serde(default)]
    pub join_columns: Option<Vec<JoinColumn>>,
    #[serde(default)]
    pub join_table: Option<JoinTable>,
    #[serde(default)]
    pub mapped_by: Option<String>,
}

impl TryFrom<RelationConfig> for Relation {
    type Error = DomainError;

    fn try_from(config: RelationConfig) -> crate::Result<Self> {
        match (config.join_columns, config.join_table, config.mapped_by) {
            (Some(columns), None, None) if !columns.is_empty() => Ok(Relation::JoinColumns(columns)),
            (Some(_), None, None) => Err(DomainError::InvalidRelationConfig("joinColumns must not be empty".into())),
            (None, Some(table), None) => Ok(Relation::JoinTable(table)),
            (None, None, Some(field)) => Ok(Relation::MappedBy(field)),
            (columns, table, mapped_by) => {
                let found = [
                    columns.map(|_| "joinColumns"),
                    table.map(|_| "joinTable"),
                    mapped_by.map(|_| "mappedBy"),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();

                Err(DomainError::InvalidRelationConfig(format!(
                    "expected exactly one of joinColumns, joinTable or mappedBy, found {:?}",
                    found
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn join_columns_reference_a_field_or_a_column() {
        let column: JoinColumn =
            serde_json::from_str(r#"{ "name": "brewery_id", "referencedField": "identifier" }"#).unwrap();

        assert_eq!(
            column,
            JoinColumn::new("brewery_id", ColumnRef::ReferencedField("identifier".into()))
        );
    }

    #[test]
    fn config_without_topology_is_rejected() {
        let err = Relation::try_from(RelationConfig::default()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid relation configuration: expected exactly one of joinColumns, joinTable or mappedBy, found []"
        );
    }

    #[test]
    fn config_with_two_topologies_is_rejected() {
        let config = RelationConfig {
            join_columns: Some(vec![JoinColumn::new("a", ColumnRef::ReferencedColumn("b".into()))]),
            mapped_by: Some("beers".into()),
            ..Default::default()
        };

        assert!(matches!(
            Relation::try_from(config),
            Err(DomainError::InvalidRelationConfig(msg)) if msg.ends_with(r#"["joinColumns", "mappedBy"]"#)
        ));
    }
}
