//! Input bindings and promises.
//!
//! Compiled templates name the producer of a promised value by raw node id
//! ([`OutputReference`]). Promoted graphs name it by [`PromiseSource`], where
//! the compiler's start sentinel has been replaced by a single
//! [`PromiseSource::GlobalInput`] pseudo-source.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use skiff_core::START_NODE_ID;

/// A promise as it appears in a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputReference {
    /// Producing node, possibly the start sentinel.
    pub node_id: String,
    /// Output variable name on that node.
    pub var: String,
}

impl OutputReference {
    /// Create an output reference.
    #[must_use]
    pub fn new(node_id: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            var: var.into(),
        }
    }
}

/// Where a promised value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromiseSource {
    /// The workflow's own inputs.
    GlobalInput,
    /// The output of another node.
    Node(String),
}

impl fmt::Display for PromiseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalInput => write!(f, "<global input>"),
            Self::Node(id) => write!(f, "{id}"),
        }
    }
}

/// A forward reference to a not-yet-produced value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Promise {
    /// Producer.
    pub source: PromiseSource,
    /// Output variable name on the producer.
    pub var: String,
}

impl Promise {
    /// Create a promise.
    #[must_use]
    pub fn new(source: PromiseSource, var: impl Into<String>) -> Self {
        Self {
            source,
            var: var.into(),
        }
    }
}

impl From<&OutputReference> for Promise {
    fn from(reference: &OutputReference) -> Self {
        let source = if reference.node_id == START_NODE_ID {
            PromiseSource::GlobalInput
        } else {
            PromiseSource::Node(reference.node_id.clone())
        };
        Self::new(source, reference.var.clone())
    }
}

/// The value side of a binding.
///
/// `R` is the promise representation: [`OutputReference`] in compiled
/// templates, [`Promise`] in promoted graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingData<R = Promise> {
    /// A literal value.
    Scalar(serde_json::Value),
    /// A value produced elsewhere.
    Promise(R),
    /// A list of bindings.
    Collection(Vec<BindingData<R>>),
    /// A string-keyed map of bindings.
    Map(BTreeMap<String, BindingData<R>>),
}

impl<R> BindingData<R> {
    /// Build a new binding tree with every promise converted by `f`.
    pub fn map_promises<S>(&self, f: &impl Fn(&R) -> S) -> BindingData<S> {
        match self {
            Self::Scalar(value) => BindingData::Scalar(value.clone()),
            Self::Promise(reference) => BindingData::Promise(f(reference)),
            Self::Collection(items) => {
                BindingData::Collection(items.iter().map(|b| b.map_promises(f)).collect())
            }
            Self::Map(entries) => BindingData::Map(
                entries
                    .iter()
                    .map(|(k, b)| (k.clone(), b.map_promises(f)))
                    .collect(),
            ),
        }
    }

    /// Every promise in this tree, depth first.
    pub fn promises(&self) -> Vec<&R> {
        let mut out = Vec::new();
        self.collect_promises(&mut out);
        out
    }

    fn collect_promises<'a>(&'a self, out: &mut Vec<&'a R>) {
        match self {
            Self::Scalar(_) => {}
            Self::Promise(reference) => out.push(reference),
            Self::Collection(items) => items.iter().for_each(|b| b.collect_promises(out)),
            Self::Map(entries) => entries.values().for_each(|b| b.collect_promises(out)),
        }
    }
}

/// Assignment of one input variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding<R = Promise> {
    /// The input variable being assigned.
    pub var: String,
    /// Its value.
    pub binding: BindingData<R>,
}

/// A binding as it appears in a compiled template.
pub type BindingRecord = Binding<OutputReference>;

impl<R> Binding<R> {
    /// Create a binding.
    #[must_use]
    pub fn new(var: impl Into<String>, binding: BindingData<R>) -> Self {
        Self {
            var: var.into(),
            binding,
        }
    }
}

impl BindingRecord {
    /// Promote to a graph binding, rewriting start-sentinel promises to the
    /// global-input pseudo-source. The record is left untouched.
    #[must_use]
    pub fn promote(&self) -> Binding {
        Binding {
            var: self.var.clone(),
            binding: self
                .binding
                .map_promises(&|reference: &OutputReference| Promise::from(reference)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn start_sentinel_becomes_global_input() {
        let record = BindingRecord::new(
            "a",
            BindingData::Promise(OutputReference::new(START_NODE_ID, "a")),
        );
        let promoted = record.promote();
        assert_eq!(
            promoted.binding,
            BindingData::Promise(Promise::new(PromiseSource::GlobalInput, "a"))
        );
        // immutable rewrite: the record still names the sentinel
        assert_eq!(
            record.binding,
            BindingData::Promise(OutputReference::new(START_NODE_ID, "a"))
        );
    }

    #[test]
    fn rewrite_recurses_into_collections_and_maps() {
        let record = BindingRecord::new(
            "xs",
            BindingData::Collection(vec![
                BindingData::Scalar(serde_json::json!(1)),
                BindingData::Map(BTreeMap::from([(
                    "k".to_owned(),
                    BindingData::Promise(OutputReference::new(START_NODE_ID, "b")),
                )])),
                BindingData::Promise(OutputReference::new("n0", "o0")),
            ]),
        );
        let promoted = record.promote();
        let sources: Vec<_> = promoted
            .binding
            .promises()
            .into_iter()
            .map(|p| p.source.clone())
            .collect();
        assert_eq!(
            sources,
            vec![PromiseSource::GlobalInput, PromiseSource::Node("n0".into())]
        );
    }

    #[test]
    fn scalars_pass_through() {
        let record: BindingRecord = Binding::new("x", BindingData::Scalar(serde_json::json!("hi")));
        assert_eq!(
            record.promote().binding,
            BindingData::Scalar(serde_json::json!("hi"))
        );
    }
}
