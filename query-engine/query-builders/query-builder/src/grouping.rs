use crate::{FlatRow, RowAssembler};
use futures::{Stream, TryStreamExt};
use indexmap::IndexMap;
use query_structure::{KeyMap, QueryValue};

/// Assembled child objects per parent key, in key order.
pub type GroupedRows = IndexMap<KeyMap, Vec<QueryValue>>;

/// Splits the rows of a batched query back into one group per parent key.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchGrouping {
    keys: Vec<KeyMap>,
    key_columns: Vec<(String, String)>,
    exists_aliases: Vec<String>,
}

impl BatchGrouping {
    /// `key_columns` maps key names to the aliases they are projected as.
    pub fn new(keys: Vec<KeyMap>, key_columns: Vec<(String, String)>, exists_aliases: Vec<String>) -> Self {
        Self {
            keys,
            key_columns,
            exists_aliases,
        }
    }

    pub fn keys(&self) -> &[KeyMap] {
        &self.keys
    }

    pub fn key_columns(&self) -> &[(String, String)] {
        &self.key_columns
    }

    pub fn exists_aliases(&self) -> &[String] {
        &self.exists_aliases
    }

    /// The parent key a row belongs to.
    pub fn key_of(&self, row: &FlatRow) -> KeyMap {
        self.key_columns
            .iter()
            .map(|(name, alias)| (name.clone(), row.get(alias).cloned().unwrap_or(QueryValue::Null)))
            .collect()
    }

    /// Whether a row carries a child, as opposed to a parent key without any.
    pub fn exists(&self, row: &FlatRow) -> bool {
        self.exists_aliases
            .iter()
            .any(|alias| row.get(alias).is_some_and(|v| !v.is_null()))
    }

    fn empty_groups(&self) -> GroupedRows {
        self.keys.iter().map(|k| (k.clone(), Vec::new())).collect()
    }

    fn push(&self, groups: &mut GroupedRows, assembler: &RowAssembler, row: &FlatRow) {
        let group = groups.entry(self.key_of(row)).or_default();

        if self.exists(row) {
            if let Some(object) = assembler.assemble(row) {
                group.push(object);
            }
        }
    }

    pub fn group<I>(&self, assembler: &RowAssembler, rows: I) -> GroupedRows
    where
        I: IntoIterator<Item = FlatRow>,
    {
        let mut groups = self.empty_groups();

        for row in rows {
            self.push(&mut groups, assembler, &row);
        }

        tracing::trace!(groups = groups.len(), "grouped batch rows");
        groups
    }

    /// Groups rows as they arrive from a stream.
    pub async fn group_stream<S, E>(&self, assembler: &RowAssembler, rows: S) -> Result<GroupedRows, E>
    where
        S: Stream<Item = Result<FlatRow, E>>,
    {
        rows.try_fold(self.empty_groups(), |mut groups, row| {
            self.push(&mut groups, assembler, &row);
            futures::future::ready(Ok(groups))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldAssembler;
    use pretty_assertions::assert_eq;

    fn key(id: i64) -> KeyMap {
        KeyMap::from([("id".to_owned(), QueryValue::Int(id))])
    }

    fn row(parent: i64, child: Option<(&str, i64)>) -> FlatRow {
        let mut row = FlatRow::from([("x1".to_owned(), QueryValue::Int(parent))]);
        let (name, id): (QueryValue, QueryValue) = child
            .map(|(n, i)| (n.into(), i.into()))
            .unwrap_or((QueryValue::Null, QueryValue::Null));

        row.insert("x2".into(), name);
        row.insert("x3".into(), id);
        row
    }

    fn fixture() -> (BatchGrouping, RowAssembler) {
        let grouping = BatchGrouping::new(
            vec![key(1), key(2), key(3)],
            vec![("id".into(), "x1".into())],
            vec!["x3".into()],
        );
        let assembler = RowAssembler::new(vec![("name".into(), FieldAssembler::Column("x2".into()))], Some("x3".into()));

        (grouping, assembler)
    }

    fn beer(name: &str) -> QueryValue {
        QueryValue::Object(vec![("name".into(), name.into())])
    }

    #[test]
    fn keys_without_children_group_to_empty_sequences() {
        let (grouping, assembler) = fixture();
        let rows = vec![
            row(1, Some(("Pilsener", 10))),
            row(2, None),
            row(1, Some(("Bock", 11))),
        ];

        let groups = grouping.group(&assembler, rows);

        assert_eq!(groups[&key(1)], vec![beer("Pilsener"), beer("Bock")]);
        assert_eq!(groups[&key(2)], Vec::<QueryValue>::new());
        assert_eq!(groups[&key(3)], Vec::<QueryValue>::new());
        assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec![key(1), key(2), key(3)]);
    }

    #[test]
    fn streams_group_like_iterators() {
        let (grouping, assembler) = fixture();
        let rows = futures::stream::iter(vec![Ok::<_, ()>(row(3, Some(("Tripel", 12)))), Ok(row(2, None))]);

        let groups = futures::executor::block_on(grouping.group_stream(&assembler, rows)).unwrap();

        assert_eq!(groups[&key(3)], vec![beer("Tripel")]);
        assert!(groups[&key(2)].is_empty());
    }

    #[test]
    fn stream_errors_abort_grouping() {
        let (grouping, assembler) = fixture();
        let rows = futures::stream::iter(vec![Ok(row(1, None)), Err("connection reset")]);

        let result = futures::executor::block_on(grouping.group_stream(&assembler, rows));

        assert_eq!(result, Err("connection reset"));
    }
}
