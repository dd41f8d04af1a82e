use crate::{
    SqlError,
    ast::Select,
    visitor::{self, ParamMode, Visitor},
};
use query_structure::QueryValue;
use std::fmt::{self, Write};

/// A visitor to generate queries for the PostgreSQL database.
///
/// The returned parameter values can be used directly with the tokio-postgres crate.
pub struct Postgres {
    query: String,
    parameters: Vec<QueryValue>,
    mode: ParamMode,
}

impl Postgres {
    fn write_literal(&mut self, value: &QueryValue) -> visitor::Result {
        match value {
            QueryValue::Null => self.write("null"),
            QueryValue::Boolean(b) => self.write(b),
            QueryValue::Int(i) => self.write(i),
            QueryValue::Float(d) => self.write(d),
            QueryValue::String(s) | QueryValue::Json(s) => self.write_quoted(s),
            QueryValue::DateTime(dt) => self.write_quoted(&query_value::stringify_datetime(dt)),
            QueryValue::List(values) => {
                self.write("array[")?;

                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.write(", ")?;
                    }
                    self.write_literal(value)?;
                }

                self.write("]")
            }
            QueryValue::Object(_) => {
                let json = serde_json::to_string(value).map_err(|err| SqlError::QueryRender(err.to_string()))?;
                self.write_quoted(&json)
            }
        }
    }

    fn write_quoted(&mut self, s: &str) -> visitor::Result {
        self.write("'")?;
        self.write(s.replace('\'', "''"))?;
        self.write("'")
    }
}

impl Visitor for Postgres {
    const C_BACKTICK_OPEN: &'static str = "\"";
    const C_BACKTICK_CLOSE: &'static str = "\"";

    fn build(select: Select, mode: ParamMode) -> Result<(String, Vec<QueryValue>), SqlError> {
        let mut postgres = Postgres {
            query: String::with_capacity(4096),
            parameters: Vec::with_capacity(128),
            mode,
        };

        Postgres::visit_select(&mut postgres, select)?;

        Ok((postgres.query, postgres.parameters))
    }

    fn write<D: fmt::Display>(&mut self, s: D) -> visitor::Result {
        write!(&mut self.query, "{s}").map_err(|err| SqlError::QueryRender(err.to_string()))
    }

    fn parameter_mode(&self) -> ParamMode {
        self.mode
    }

    fn visit_parameterized(&mut self, value: QueryValue) -> visitor::Result {
        match self.mode {
            ParamMode::Inline => self.write_literal(&value),
            ParamMode::Bind => {
                self.parameters.push(value);
                let position = self.parameters.len();
                self.write(format_args!("${position}"))
            }
        }
    }

    fn visit_raw_value(&mut self, value: QueryValue) -> visitor::Result {
        self.write_literal(&value)
    }
}
