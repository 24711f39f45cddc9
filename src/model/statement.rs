//! Statements, parameters, and execution results

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::RowSet;
use super::RowSource;
use super::Value;

/// Direction of a bound statement parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterDirection {
    /// Input-only parameter.
    #[default]
    Input,
    /// Output-only parameter.
    Output,
    /// Bidirectional parameter.
    InputOutput,
    /// Return value of a stored procedure.
    ReturnValue,
}

impl fmt::Display for ParameterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "Input",
            Self::Output => "Output",
            Self::InputOutput => "InputOutput",
            Self::ReturnValue => "ReturnValue",
        };
        f.write_str(name)
    }
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, e.g. `@p0`.
    pub name: String,
    /// Bound value.
    pub value: Value,
    /// Driver-reported size.
    pub size: i32,
    /// Numeric precision.
    pub precision: u8,
    /// Numeric scale.
    pub scale: u8,
    /// Parameter direction.
    pub direction: ParameterDirection,
}

impl Parameter {
    /// Creates a new input parameter with default size and precision.
    pub fn input(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            size: 0,
            precision: 0,
            scale: 0,
            direction: ParameterDirection::Input,
        }
    }

    /// Sets the driver-reported size.
    pub fn with_size(mut self, size: i32) -> Self {
        self.size = size;
        self
    }

    /// Sets the numeric precision and scale.
    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Sets the parameter direction.
    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// A SQL statement about to be executed, with its bound parameters.
///
/// Parameter order is the caller-supplied order and participates in the
/// cache key; callers must supply a deterministic order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Raw statement text, possibly carrying a cache-policy directive.
    pub text: String,
    /// Ordered bound parameters.
    pub parameters: Vec<Parameter>,
}

impl Statement {
    /// Creates a new statement with no parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a bound parameter.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// The shape of result the caller expects from a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// A tabular result set.
    Rows,
    /// A single scalar value.
    Scalar,
    /// An affected-row count.
    NonQuery,
}

/// A statement execution result as seen by the interceptor.
///
/// `Cursor` only ever appears as interceptor input; after the write path
/// runs, a cursor has been drained and replaced by a `Rows` snapshot.
pub enum StatementResult {
    /// A single scalar value.
    Scalar(Value),
    /// Number of rows affected by a non-query statement.
    NonQuery(u64),
    /// A live result cursor, not yet materialized.
    Cursor(Box<dyn RowSource>),
    /// A materialized row snapshot.
    Rows(RowSet),
    /// The statement produced no result.
    None,
}

impl StatementResult {
    /// Returns the kind of this result, or `None` for an absent result.
    pub fn kind(&self) -> Option<ResultKind> {
        match self {
            Self::Scalar(_) => Some(ResultKind::Scalar),
            Self::NonQuery(_) => Some(ResultKind::NonQuery),
            Self::Cursor(_) | Self::Rows(_) => Some(ResultKind::Rows),
            Self::None => None,
        }
    }

    /// Returns the snapshot if this result is materialized rows.
    pub fn as_rows(&self) -> Option<&RowSet> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

impl fmt::Debug for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::NonQuery(count) => f.debug_tuple("NonQuery").field(count).finish(),
            Self::Cursor(_) => f.write_str("Cursor(..)"),
            Self::Rows(rows) => f.debug_tuple("Rows").field(rows).finish(),
            Self::None => f.write_str("None"),
        }
    }
}
