//! Typed input/output interfaces of tasks and workflows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scalar types understood by the remote type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleType {
    /// No value.
    None,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Boolean.
    Boolean,
    /// Point in time.
    Datetime,
    /// Length of time.
    Duration,
    /// Binary blob held inline.
    Binary,
    /// Error document.
    Error,
    /// Schemaless structured value.
    Struct,
}

/// The declared type of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralType {
    /// A scalar.
    Simple(SimpleType),
    /// A homogeneous list.
    CollectionOf(Box<LiteralType>),
    /// A string-keyed map with homogeneous values.
    MapValueOf(Box<LiteralType>),
    /// An offloaded file or directory.
    Blob {
        /// Declared format, empty for any.
        #[serde(default)]
        format: String,
    },
    /// An offloaded tabular dataset.
    Schema,
}

/// A named, typed parameter of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Declared type.
    #[serde(rename = "type")]
    pub literal_type: LiteralType,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Variable {
    /// A variable of a scalar type.
    #[must_use]
    pub fn simple(simple: SimpleType) -> Self {
        Self {
            literal_type: LiteralType::Simple(simple),
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// Named inputs and outputs of a task or workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypedInterface {
    /// Inputs, keyed by name.
    #[serde(default)]
    pub inputs: BTreeMap<String, Variable>,
    /// Outputs, keyed by name.
    #[serde(default)]
    pub outputs: BTreeMap<String, Variable>,
}

impl TypedInterface {
    /// An interface with no inputs or outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input.
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, var: Variable) -> Self {
        self.inputs.insert(name.into(), var);
        self
    }

    /// Add an output.
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>, var: Variable) -> Self {
        self.outputs.insert(name.into(), var);
        self
    }

    /// Returns `true` if an output named `name` is declared.
    #[must_use]
    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }
}
