// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output - deferred values resolved by the provisioning engine
//!
//! An `Output<T>` is a function from the engine's resolved state to `T`.
//! Resolving the same output against the same state is deterministic, and
//! resolving it before its producers are known yields
//! [`OutputError::Unknown`].
//!
//! # Mathematical Model
//!
//! ```text
//! Output<T> ≅ ResolvedOutputs → Result<T, OutputError>
//! ```
//!
//! `map` and `apply2` satisfy the functor/applicative laws the same way the
//! values they wrap do; `then` short-circuits on the first failure.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt::{self, Debug};
use std::sync::Arc;

use super::{OutputError, OutputResult, ResolvedOutputs};
use crate::graph::NodeId;

type Sampler<T> = Arc<dyn Fn(&ResolvedOutputs) -> OutputResult<T> + Send + Sync>;

/// A value that becomes known once the engine resolves the graph
pub struct Output<T> {
    /// Nodes this value is derived from
    dependencies: BTreeSet<NodeId>,
    /// Whether the value must be redacted when displayed
    secret: bool,
    /// Produces the value from the engine's resolved state
    sampler: Sampler<T>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            dependencies: self.dependencies.clone(),
            secret: self.secret,
            sampler: Arc::clone(&self.sampler),
        }
    }
}

impl<T> Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(&format!("Output<{}>", std::any::type_name::<T>()))
            .field("dependencies", &self.dependencies)
            .field("secret", &self.secret)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// Create an output whose value is already known
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let version = Output::known("1.28".to_string());
    /// assert_eq!(version.resolve(&ResolvedOutputs::new()).unwrap(), "1.28");
    /// ```
    pub fn known(value: T) -> Self {
        Self {
            dependencies: BTreeSet::new(),
            secret: false,
            sampler: Arc::new(move |_| Ok(value.clone())),
        }
    }

    /// Resolve the value against the engine's state
    pub fn resolve(&self, resolved: &ResolvedOutputs) -> OutputResult<T> {
        (self.sampler)(resolved)
    }

    /// Nodes that must be resolved before this value is known
    pub fn dependencies(&self) -> &BTreeSet<NodeId> {
        &self.dependencies
    }

    /// Whether this value is redacted when displayed
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Mark this value as secret
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Transform the value once it is known
    pub fn map<U, F>(self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let sampler = self.sampler;
        Output {
            dependencies: self.dependencies,
            secret: self.secret,
            sampler: Arc::new(move |resolved| sampler(resolved).map(&f)),
        }
    }

    /// Transform the value with a function that may fail
    ///
    /// The error is surfaced as [`OutputError::Apply`].
    pub fn then<U, E, F>(self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        E: std::error::Error,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let sampler = self.sampler;
        Output {
            dependencies: self.dependencies,
            secret: self.secret,
            sampler: Arc::new(move |resolved| {
                let value = sampler(resolved)?;
                f(value).map_err(|err| OutputError::Apply(err.to_string()))
            }),
        }
    }

    /// Combine two outputs with a binary function
    ///
    /// The result depends on the union of both inputs' dependencies and is
    /// secret if either input is.
    pub fn apply2<U, V, F>(self, other: Output<U>, f: F) -> Output<V>
    where
        U: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: Fn(T, U) -> V + Send + Sync + 'static,
    {
        let mut dependencies = self.dependencies;
        dependencies.extend(other.dependencies.iter().copied());
        let first = self.sampler;
        let second = other.sampler;

        Output {
            dependencies,
            secret: self.secret || other.secret,
            sampler: Arc::new(move |resolved| {
                let a = first(resolved)?;
                let b = second(resolved)?;
                Ok(f(a, b))
            }),
        }
    }

    /// Pair two outputs
    pub fn zip<U>(self, other: Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.apply2(other, |a, b| (a, b))
    }
}

impl<T: DeserializeOwned + Clone + Send + Sync + 'static> Output<T> {
    /// Read an output path of a declared node
    pub fn from_resource(node: NodeId, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            dependencies: BTreeSet::from([node]),
            secret: false,
            sampler: Arc::new(move |resolved| resolved.decode(node, &path)),
        }
    }
}

impl<T: Serialize + Clone + Send + Sync + 'static> Output<T> {
    /// Erase the value type into JSON
    pub fn into_json(self) -> Output<Value> {
        self.then(serde_json::to_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved_with(node: NodeId, value: Value) -> ResolvedOutputs {
        let mut resolved = ResolvedOutputs::new();
        if let Value::Object(map) = value {
            resolved.insert(node, map);
        }
        resolved
    }

    #[test]
    fn test_known_output() {
        let output = Output::known(42);
        assert_eq!(output.resolve(&ResolvedOutputs::new()).unwrap(), 42);
        assert!(output.dependencies().is_empty());
    }

    #[test]
    fn test_resource_output_is_unknown_until_resolved() {
        let node = NodeId::new(2);
        let endpoint: Output<String> = Output::from_resource(node, "endpoint");
        assert!(endpoint.resolve(&ResolvedOutputs::new()).is_err());

        let resolved = resolved_with(node, json!({"endpoint": "https://hub"}));
        assert_eq!(endpoint.resolve(&resolved).unwrap(), "https://hub");
        assert!(endpoint.dependencies().contains(&node));
    }

    #[test]
    fn test_map_composition() {
        // Functor law: map f . map g = map (f . g)
        let output = Output::known(2);
        let result1 = output.clone().map(|x| x + 1).map(|x| x * 2);
        let result2 = output.map(|x| (x + 1) * 2);

        let resolved = ResolvedOutputs::new();
        assert_eq!(result1.resolve(&resolved), result2.resolve(&resolved));
    }

    #[test]
    fn test_apply2_unions_dependencies() {
        let a: Output<String> = Output::from_resource(NodeId::new(1), "token");
        let b: Output<String> = Output::from_resource(NodeId::new(4), "ca").secret();
        let joined = a.apply2(b, |t, c| format!("{}:{}", t, c));

        assert_eq!(joined.dependencies().len(), 2);
        assert!(joined.is_secret());
    }

    #[test]
    fn test_then_surfaces_failure() {
        let output = Output::known("not-a-number".to_string())
            .then(|s| s.parse::<u32>());
        let err = output.resolve(&ResolvedOutputs::new()).unwrap_err();
        assert!(matches!(err, OutputError::Apply(_)));
    }

    #[test]
    fn test_secret_survives_map() {
        let output = Output::known("kubeconfig".to_string()).secret();
        assert!(output.map(|s| s.len()).is_secret());
    }
}
