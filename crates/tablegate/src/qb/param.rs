//! Ordered bind-value storage with dialect-aware placeholder numbering.

use crate::dialect::Dialect;
use crate::value::{BindKind, Value};

/// A collection of bound values in placeholder order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a value and return its 1-based index.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.params.push(value.into());
        self.params.len()
    }

    /// Add a value and return the placeholder text that refers to it.
    pub fn push_placeholder(&mut self, dialect: Dialect, value: impl Into<Value>) -> String {
        let idx = self.push(value);
        dialect.placeholder(idx)
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Bound values in placeholder order.
    pub fn as_slice(&self) -> &[Value] {
        &self.params
    }

    /// Bind kind of each value, in placeholder order.
    pub fn bind_kinds(&self) -> Vec<BindKind> {
        self.params.iter().map(Value::bind_kind).collect()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.params
    }
}
