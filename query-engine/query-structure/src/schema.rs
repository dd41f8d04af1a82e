use crate::{DomainError, Field, ObjectField, ObjectFieldKind, Relation, ScalarField};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A physical table, optionally qualified by its schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum TableRef {
    Name(String),
    Qualified { schema: String, name: String },
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        TableRef::Name(name.into())
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableRef::Qualified {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TableRef::Name(name) => name,
            TableRef::Qualified { name, .. } => name,
        }
    }

    pub fn schema(&self) -> Option<&str> {
        match self {
            TableRef::Name(_) => None,
            TableRef::Qualified { schema, .. } => Some(schema),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Name(name) => write!(f, "{name}"),
            TableRef::Qualified { schema, name } => write!(f, "{schema}.{name}"),
        }
    }
}

/// An entity type: the table it lives in, its fields and the fields identifying a row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub table: TableRef,
    #[serde(default)]
    pub key_fields: Vec<String>,
    #[serde(deserialize_with = "fields_by_name")]
    pub fields: IndexMap<String, Field>,
}

fn fields_by_name<'de, D>(deserializer: D) -> Result<IndexMap<String, Field>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = Vec::<Field>::deserialize(deserializer)?;

    Ok(fields.into_iter().map(|f| (f.name().to_owned(), f)).collect())
}

impl Entity {
    pub fn new(name: impl Into<String>, table: TableRef) -> Self {
        Self {
            name: name.into(),
            table,
            key_fields: Vec::new(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_key(mut self, field: impl Into<String>) -> Self {
        self.key_fields.push(field.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        let field = field.into();
        self.fields.insert(field.name().to_owned(), field);
        self
    }

    pub fn field(&self, name: &str) -> crate::Result<&Field> {
        self.fields.get(name).ok_or_else(|| DomainError::FieldNotFound {
            entity: self.name.clone(),
            field: name.to_owned(),
        })
    }

    pub fn scalar_field(&self, name: &str) -> crate::Result<&ScalarField> {
        match self.field(name)? {
            Field::Scalar(sf) => Ok(sf),
            Field::Object(_) => Err(DomainError::NotAScalarField {
                entity: self.name.clone(),
                field: name.to_owned(),
            }),
        }
    }

    pub fn object_field(&self, name: &str) -> crate::Result<&ObjectField> {
        match self.field(name)? {
            Field::Object(of) => Ok(of),
            Field::Scalar(_) => Err(DomainError::NotAnObjectField {
                entity: self.name.clone(),
                field: name.to_owned(),
            }),
        }
    }

    /// The scalar fields making up the key, in declaration order.
    pub fn key_fields(&self) -> crate::Result<Vec<&ScalarField>> {
        self.key_fields.iter().map(|name| self.scalar_field(name)).collect()
    }

    pub fn is_key_field(&self, name: &str) -> bool {
        self.key_fields.iter().any(|k| k == name)
    }
}

/// All entities known to the compiler, indexed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entities: IndexMap<String, Entity>,
}

impl Schema {
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> crate::Result<Self> {
        let schema = Self {
            entities: entities.into_iter().map(|e| (e.name.clone(), e)).collect(),
        };

        schema.validate()?;
        Ok(schema)
    }

    /// Reads a JSON array of entity definitions.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let entities: Vec<Entity> =
            serde_json::from_str(json).map_err(|err| DomainError::InvalidSchema(err.to_string()))?;

        Self::new(entities)
    }

    pub fn entity(&self, name: &str) -> crate::Result<&Entity> {
        self.entities
            .get(name)
            .ok_or_else(|| DomainError::EntityNotFound { name: name.to_owned() })
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    fn validate(&self) -> crate::Result<()> {
        for entity in self.entities.values() {
            entity.key_fields()?;

            for field in entity.fields.values() {
                let Field::Object(of) = field else { continue };
                let target = self.entity(&of.target)?;

                if let ObjectFieldKind::Related(Relation::MappedBy(inverse)) = &of.kind {
                    let owning = target.object_field(inverse)?;

                    match &owning.kind {
                        ObjectFieldKind::Related(Relation::MappedBy(_)) | ObjectFieldKind::Embedded => {
                            return Err(DomainError::InvalidRelation {
                                field: format!("{}.{}", entity.name, of.name),
                                reason: format!("`{}.{}` does not own the relation", target.name, inverse),
                            });
                        }
                        ObjectFieldKind::Related(_) if owning.target != entity.name => {
                            return Err(DomainError::InvalidRelation {
                                field: format!("{}.{}", entity.name, of.name),
                                reason: format!("`{}.{}` does not point back to `{}`", target.name, inverse, entity.name),
                            });
                        }
                        ObjectFieldKind::Related(_) => (),
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = indoc! {r#"
        [
          {
            "name": "Beer",
            "table": "beer",
            "keyFields": ["identifier"],
            "fields": [
              { "kind": "scalar", "name": "identifier", "column": "id", "type": "Int" },
              { "kind": "scalar", "name": "name", "column": "name", "type": "String" },
              {
                "kind": "object",
                "name": "brewery",
                "target": "Brewery",
                "relation": { "joinColumns": [{ "name": "brewery_id", "referencedField": "identifier" }] }
              }
            ]
          },
          {
            "name": "Brewery",
            "table": { "schema": "db", "name": "brewery" },
            "keyFields": ["identifier"],
            "fields": [
              { "kind": "scalar", "name": "identifier", "column": "id", "type": "Int" },
              { "kind": "object", "name": "beers", "target": "Beer", "isList": true, "relation": { "mappedBy": "brewery" } }
            ]
          }
        ]
    "#};

    #[test]
    fn reads_entities_from_json() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let brewery = schema.entity("Brewery").unwrap();

        assert_eq!(brewery.table, TableRef::qualified("db", "brewery"));
        assert_eq!(brewery.key_fields().unwrap()[0].column, "id");
        assert!(brewery.object_field("beers").unwrap().is_list);
        assert!(matches!(
            schema.entity("Beer").unwrap().object_field("brewery").unwrap().kind,
            ObjectFieldKind::Related(Relation::JoinColumns(_))
        ));
    }

    #[test]
    fn unknown_entities_and_fields_are_reported() {
        let schema = Schema::from_json(SCHEMA).unwrap();

        assert_eq!(
            schema.entity("Hop").unwrap_err(),
            DomainError::EntityNotFound { name: "Hop".into() }
        );
        assert_eq!(
            schema.entity("Beer").unwrap().scalar_field("brewery").unwrap_err(),
            DomainError::NotAScalarField {
                entity: "Beer".into(),
                field: "brewery".into()
            }
        );
    }

    #[test]
    fn relation_must_declare_exactly_one_topology() {
        let json = SCHEMA.replace(
            r#"{ "mappedBy": "brewery" }"#,
            r#"{ "mappedBy": "brewery", "joinColumns": [{ "name": "id", "referencedColumn": "brewery_id" }] }"#,
        );

        let err = Schema::from_json(&json).unwrap_err();

        assert!(matches!(err, DomainError::InvalidSchema(msg) if msg.contains("exactly one")));
    }

    #[test]
    fn mapped_by_must_point_to_an_owning_field() {
        let json = SCHEMA.replace(r#""mappedBy": "brewery""#, r#""mappedBy": "name""#);

        assert_eq!(
            Schema::from_json(&json).unwrap_err(),
            DomainError::NotAnObjectField {
                entity: "Beer".into(),
                field: "name".into()
            }
        );
    }
}
