use super::*;

/// The joined table and its conditions.
#[derive(Debug, PartialEq, Clone)]
pub struct JoinData {
    pub table: Table,
    pub conditions: ConditionTree,
    pub lateral: bool,
}

impl JoinData {
    /// The joined table may reference tables joined before it.
    pub fn lateral(mut self) -> Self {
        self.lateral = true;
        self
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Join {
    /// `inner join`
    Inner(JoinData),
    /// `left join`
    Left(JoinData),
}

/// An item that can be joined.
pub trait Joinable {
    fn on<T>(self, conditions: T) -> JoinData
    where
        T: Into<ConditionTree>;
}

impl<U> Joinable for U
where
    U: Into<Table>,
{
    fn on<T>(self, conditions: T) -> JoinData
    where
        T: Into<ConditionTree>,
    {
        JoinData {
            table: self.into(),
            conditions: conditions.into(),
            lateral: false,
        }
    }
}
