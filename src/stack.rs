// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cross-stack references
//!
//! A stack publishes named exports; another stack reads them through a
//! [`StackReference`]. Values read from a reference are already resolved, so
//! they enter the reading stack as known outputs. Kubeconfigs stay secret.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::cluster::ClusterConnection;
use crate::errors::{DeclarationError, DeclarationResult};
use crate::output::Output;

/// Resolved exports of another stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackReference {
    name: String,
    outputs: BTreeMap<String, Value>,
}

impl StackReference {
    pub fn new(name: impl Into<String>, outputs: BTreeMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            outputs,
        }
    }

    /// Fully qualified name of the referenced stack
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw export value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.outputs.get(key)
    }

    /// Decode an export
    ///
    /// A missing export decodes as `null`.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> DeclarationResult<T> {
        let value = self.outputs.get(key).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| {
            DeclarationError::configuration(format!(
                "export {} of stack {} is invalid: {}",
                key, self.name, e
            ))
        })
    }

    /// Export as a known output
    pub fn output<T>(&self, key: &str) -> DeclarationResult<Output<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        Ok(Output::known(self.decode(key)?))
    }

    /// Export as a known secret output
    pub fn secret_output<T>(&self, key: &str) -> DeclarationResult<Output<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        Ok(self.output(key)?.secret())
    }

    /// Connection to a cluster from its kubeconfig and endpoint exports
    ///
    /// The kubeconfig export is required; a missing endpoint reads as empty.
    pub fn cluster_connection(
        &self,
        kubeconfig_key: &str,
        endpoint_key: &str,
    ) -> DeclarationResult<ClusterConnection> {
        let kubeconfig: Option<String> = self.decode(kubeconfig_key)?;
        if kubeconfig.is_none() {
            return Err(DeclarationError::configuration(format!(
                "stack {} does not export {}",
                self.name, kubeconfig_key
            )));
        }
        let endpoint: Option<String> = self.decode(endpoint_key)?;

        Ok(ClusterConnection {
            kubeconfig: Output::known(kubeconfig).secret(),
            endpoint: Output::known(endpoint.unwrap_or_default()),
        })
    }
}
