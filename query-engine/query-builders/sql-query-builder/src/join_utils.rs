use query_structure::{
    ColumnRef, DomainError, Entity, Field, JoinColumn, ObjectField, Relation, ScalarType, Schema, TableRef,
};

use crate::{
    Context, SqlError,
    ast::*,
};

/// A relation between two entities, resolved down to physical column pairs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelationLink<'s> {
    pub(crate) child: &'s Entity,
    topology: Topology<'s>,
    /// Types of the parent columns, when a field of the referenced entity is stored in them.
    parent_types: Vec<Option<ScalarType>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Topology<'s> {
    /// `(parent column, child column)` pairs.
    Direct(Vec<(String, String)>),
    /// A junction table, with `(junction column, parent column)` and `(junction column, child column)` pairs.
    Junction {
        table: &'s TableRef,
        parent: Vec<(String, String)>,
        child: Vec<(String, String)>,
    },
}

/// What it takes to restrict a child query to the rows related to one parent row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Correlation {
    /// Joins to add to the child query.
    pub(crate) joins: Vec<Join>,
    /// The condition tying the child query to the parent alias.
    pub(crate) condition: ConditionTree,
    /// Child-side columns that are only null when no child row matched.
    pub(crate) exists_columns: Vec<Column>,
}

impl<'s> RelationLink<'s> {
    /// Resolves `field` of `parent`. Relations declared with `mappedBy` are resolved through their owning side.
    pub(crate) fn resolve(schema: &'s Schema, parent: &'s Entity, field: &'s ObjectField) -> crate::Result<Self> {
        let child = schema.entity(&field.target)?;

        let relation = field.relation().ok_or_else(|| {
            SqlError::InvalidRequest(format!(
                "`{}.{}` is embedded and cannot be joined",
                parent.name, field.name
            ))
        })?;

        let (topology, parent_types) = match relation {
            Relation::JoinColumns(columns) => (
                Topology::Direct(
                    columns
                        .iter()
                        .map(|jc| Ok((jc.name.clone(), referenced_column(child, jc)?)))
                        .collect::<crate::Result<_>>()?,
                ),
                referenced_types(columns, child),
            ),
            Relation::JoinTable(join_table) => (
                Topology::Junction {
                    table: &join_table.table,
                    parent: junction_pairs(&join_table.join_columns, parent)?,
                    child: junction_pairs(&join_table.inverse_join_columns, child)?,
                },
                referenced_types(&join_table.join_columns, parent),
            ),
            Relation::MappedBy(owning_field) => match child.object_field(owning_field)?.relation() {
                Some(Relation::JoinColumns(columns)) => (
                    Topology::Direct(
                        columns
                            .iter()
                            .map(|jc| Ok((referenced_column(parent, jc)?, jc.name.clone())))
                            .collect::<crate::Result<_>>()?,
                    ),
                    referenced_types(columns, parent),
                ),
                Some(Relation::JoinTable(join_table)) => (
                    Topology::Junction {
                        table: &join_table.table,
                        parent: junction_pairs(&join_table.inverse_join_columns, parent)?,
                        child: junction_pairs(&join_table.join_columns, child)?,
                    },
                    referenced_types(&join_table.inverse_join_columns, parent),
                ),
                Some(Relation::MappedBy(_)) | None => {
                    return Err(DomainError::InvalidRelation {
                        field: format!("{}.{}", parent.name, field.name),
                        reason: format!("`{}.{}` does not own the relation", child.name, owning_field),
                    }
                    .into());
                }
            },
        };

        tracing::trace!(parent = %parent.name, field = %field.name, ?topology, "resolved relation");

        Ok(Self {
            child,
            topology,
            parent_types,
        })
    }

    /// Parent columns the relation reads, in declaration order.
    pub(crate) fn parent_columns(&self) -> Vec<&str> {
        match &self.topology {
            Topology::Direct(pairs) => pairs.iter().map(|(parent, _)| parent.as_str()).collect(),
            Topology::Junction { parent, .. } => parent.iter().map(|(_, column)| column.as_str()).collect(),
        }
    }

    /// Parent columns with their types, in declaration order.
    pub(crate) fn parent_column_types(&self) -> Vec<(&str, Option<ScalarType>)> {
        self.parent_columns().into_iter().zip(self.parent_types.iter().copied()).collect()
    }

    /// Correlates the child table aliased `child_alias` with the parent aliased `parent_alias`.
    ///
    /// Junction tables get their own alias and are inner joined to the child.
    pub(crate) fn correlate(&self, ctx: &Context<'_>, parent_alias: &str, child_alias: &str) -> Correlation {
        match &self.topology {
            Topology::Direct(pairs) => Correlation {
                joins: Vec::new(),
                condition: equalities(
                    pairs.iter().map(|(parent, child)| (child.as_str(), parent.as_str())),
                    child_alias,
                    parent_alias,
                ),
                exists_columns: pairs
                    .iter()
                    .map(|(_, child)| Column::from((child_alias, child.as_str())))
                    .collect(),
            },
            Topology::Junction { table, parent, child } => {
                let junction_alias = ctx.next_table_alias().to_string();

                let junction = ctx
                    .table(table)
                    .alias(junction_alias.clone())
                    .on(equalities(as_str_pairs(child), &junction_alias, child_alias));

                Correlation {
                    joins: vec![Join::Inner(junction)],
                    condition: equalities(as_str_pairs(parent), &junction_alias, parent_alias),
                    exists_columns: child
                        .iter()
                        .map(|(junction, _)| Column::from((junction_alias.as_str(), junction.as_str())))
                        .collect(),
                }
            }
        }
    }
}

/// `left.a = right.b and ...` for every `(a, b)` pair.
fn equalities<'p>(
    pairs: impl Iterator<Item = (&'p str, &'p str)>,
    left_alias: &str,
    right_alias: &str,
) -> ConditionTree {
    ConditionTree::all(pairs.map(|(left, right)| {
        Column::from((left_alias, left))
            .equals(Column::from((right_alias, right)))
            .into()
    }))
}

fn as_str_pairs(pairs: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    pairs.iter().map(|(a, b)| (a.as_str(), b.as_str()))
}

fn junction_pairs(columns: &[JoinColumn], referenced: &Entity) -> crate::Result<Vec<(String, String)>> {
    columns
        .iter()
        .map(|jc| Ok((jc.name.clone(), referenced_column(referenced, jc)?)))
        .collect()
}

fn referenced_types(columns: &[JoinColumn], referenced: &Entity) -> Vec<Option<ScalarType>> {
    columns.iter().map(|jc| referenced_type(referenced, jc)).collect()
}

/// The type of the field of `entity` a join column points at.
fn referenced_type(entity: &Entity, join_column: &JoinColumn) -> Option<ScalarType> {
    let field = match &join_column.referenced {
        ColumnRef::ReferencedField(name) => entity.scalar_field(name).ok(),
        ColumnRef::ReferencedColumn(column) => entity.fields.values().find_map(|field| match field {
            Field::Scalar(sf) if sf.column == *column => Some(sf),
            _ => None,
        }),
    };

    field.map(|sf| sf.type_identifier)
}

/// The column of `entity` a join column points at.
pub(crate) fn referenced_column(entity: &Entity, join_column: &JoinColumn) -> crate::Result<String> {
    match &join_column.referenced {
        ColumnRef::ReferencedColumn(column) => Ok(column.clone()),
        ColumnRef::ReferencedField(field) => Ok(entity.scalar_field(field)?.column.clone()),
    }
}
