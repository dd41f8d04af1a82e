use std::fmt;

/// A generated name, unique within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alias {
    Table(usize),
    Field(usize),
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(index) => write!(f, "t{}", index),
            Self::Field(index) => write!(f, "x{}", index),
        }
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_render_with_their_prefix() {
        assert_eq!(Alias::Table(1).to_string(), "t1");
        assert_eq!(String::from(Alias::Field(12)), "x12");
    }
}
