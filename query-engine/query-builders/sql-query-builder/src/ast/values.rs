use super::*;

/// One row of a `values` list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub values: Vec<Expression>,
}

impl Row {
    pub fn push(&mut self, value: impl Into<Expression>) {
        self.values.push(value.into());
    }
}

impl<T> FromIterator<T> for Row
where
    T: Into<Expression>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Row {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A literal table: `(values (1, 'a'), (2, 'b'))`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Values {
    pub rows: Vec<Row>,
}

impl Values {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
