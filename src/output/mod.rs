// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deferred Outputs
//!
//! Resource outputs (IDs, endpoints, credentials) are not known while the
//! graph is being declared. They become known only after an external engine
//! has created the resources. This module models such values as
//! [`Output<T>`]: a pure function from the engine's resolved state to a value.
//!
//! # Resolution Model
//!
//! ```text
//! Declaration pass                    Provisioning engine
//! ────────────────                    ───────────────────
//!
//! vpc.vpc_id()  ──┐                   creates vpc  → {"vpcId": "vpc-1"}
//!                 ├─ Output<String>   creates eks  → {"endpoint": ...}
//! eks.endpoint()──┘        │                  │
//!                          ▼                  ▼
//!                     resolve(&ResolvedOutputs) → "https://..."
//! ```
//!
//! An `Output<T>` also carries the set of nodes it was derived from. Handing
//! an output to another resource's inputs therefore records an implicit
//! dependency edge, so the engine never creates a consumer before its
//! producer.
//!
//! # Composition
//!
//! - [`Output::map`] - transform a value
//! - [`Output::then`] - fallible transform (decode, parse)
//! - [`Output::apply2`] / [`Output::zip`] - join two upstream values
//! - [`combinators::all`] - join a list of outputs
//!
//! ```rust,ignore
//! let config = token
//!     .zip(ca_crt)
//!     .then(|(token, ca)| ClusterConnectionConfig::from_token_secret(&token, &ca)?.to_json())
//!     .secret();
//! ```

pub mod combinators;
pub mod deferred;
pub mod input;

pub use combinators::all;
pub use deferred::Output;
pub use input::{Input, InputValue, Inputs};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::graph::NodeId;

/// Errors raised while resolving a deferred value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    /// The producing node has not been resolved by the engine yet
    #[error("Output {path} of node {node} is not known yet")]
    Unknown { node: NodeId, path: String },

    /// The resolved value does not have the expected shape
    #[error("Output {path} of node {node} could not be decoded: {reason}")]
    Decode {
        node: NodeId,
        path: String,
        reason: String,
    },

    /// A `then` transformation failed
    #[error("Output transformation failed: {0}")]
    Apply(String),
}

/// Result of resolving a deferred value
pub type OutputResult<T> = Result<T, OutputError>;

/// Outputs reported by the engine, keyed by node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOutputs {
    values: BTreeMap<NodeId, Map<String, Value>>,
}

impl ResolvedOutputs {
    /// Create an empty resolution (nothing known yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outputs reported for a node
    pub fn insert(&mut self, node: NodeId, outputs: Map<String, Value>) {
        self.values.insert(node, outputs);
    }

    /// Whether the engine has reported outputs for the node
    pub fn contains(&self, node: NodeId) -> bool {
        self.values.contains_key(&node)
    }

    /// All outputs of a node
    pub fn outputs_of(&self, node: NodeId) -> Option<&Map<String, Value>> {
        self.values.get(&node)
    }

    /// Number of resolved nodes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no node has been resolved
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a dotted output path such as `status.namespace`
    ///
    /// Keys that themselves contain dots (`data.ca.crt`) are matched
    /// greedily: an exact key wins over a nested lookup.
    pub fn lookup(&self, node: NodeId, path: &str) -> Option<&Value> {
        let outputs = self.values.get(&node)?;
        lookup_in(outputs, path)
    }

    /// Decode an output path into a typed value
    ///
    /// A resolved node with no value at `path` decodes as JSON `null`, so
    /// optional outputs come back as `None`.
    pub fn decode<T: DeserializeOwned>(&self, node: NodeId, path: &str) -> OutputResult<T> {
        if !self.contains(node) {
            return Err(OutputError::Unknown {
                node,
                path: path.to_string(),
            });
        }
        let value = self.lookup(node, path).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| OutputError::Decode {
            node,
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

fn lookup_in<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(path) {
        return Some(value);
    }
    for (idx, _) in path.match_indices('.') {
        let (head, rest) = (&path[..idx], &path[idx + 1..]);
        if let Some(Value::Object(inner)) = map.get(head) {
            if let Some(found) = lookup_in(inner, rest) {
                return Some(found);
            }
        }
    }
    None
}
