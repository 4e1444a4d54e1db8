use cask_core::{Command, Result, Row, RowNames, RowsAffected, Value};
use std::sync::Arc;

/// Column names and rows of one scripted result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: RowNames,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, values are matched to the columns by position.
    pub fn row(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.rows.push(values.into_iter().collect());
        self
    }
}

/// What the executor returns for a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    ResultSets(Vec<ResultSet>),
    Scalar(Value),
    Affected(RowsAffected),
}

impl Response {
    pub fn rows(result_set: ResultSet) -> Self {
        Response::ResultSets(vec![result_set])
    }

    pub fn affected(rows_affected: u64) -> Self {
        Response::Affected(RowsAffected {
            rows_affected,
            last_affected_id: None,
        })
    }
}

impl From<ResultSet> for Response {
    fn from(value: ResultSet) -> Self {
        Response::rows(value)
    }
}

/// Computes the response of a command, can inspect its parameters.
pub type Responder = Arc<dyn Fn(&Command) -> Result<Response> + Send + Sync>;
