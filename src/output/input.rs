// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource inputs: values that are either known now or deferred

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::{Output, OutputResult, ResolvedOutputs};
use crate::errors::DeclarationResult;
use crate::graph::NodeId;

/// An argument to a resource: a plain value or another resource's output
#[derive(Debug, Clone)]
pub enum Input<T> {
    /// Known at declaration time
    Value(T),
    /// Known once the engine resolves the producer
    Output(Output<T>),
}

impl<T: Clone + Send + Sync + 'static> Input<T> {
    /// Lift into an output (known values resolve immediately)
    pub fn into_output(self) -> Output<T> {
        match self {
            Input::Value(value) => Output::known(value),
            Input::Output(output) => output,
        }
    }

    /// Transform the value, deferred or not
    pub fn map<U, F>(self, f: F) -> Input<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        match self {
            Input::Value(value) => Input::Value(f(value)),
            Input::Output(output) => Input::Output(output.map(f)),
        }
    }
}

impl From<&str> for Input<String> {
    fn from(value: &str) -> Self {
        Input::Value(value.to_string())
    }
}

impl From<String> for Input<String> {
    fn from(value: String) -> Self {
        Input::Value(value)
    }
}

impl From<bool> for Input<bool> {
    fn from(value: bool) -> Self {
        Input::Value(value)
    }
}

impl From<Vec<String>> for Input<Vec<String>> {
    fn from(value: Vec<String>) -> Self {
        Input::Value(value)
    }
}

impl<T> From<Output<T>> for Input<T> {
    fn from(output: Output<T>) -> Self {
        Input::Output(output)
    }
}

/// Type-erased input as stored on a resource node
#[derive(Debug, Clone)]
pub enum InputValue {
    /// Fully known JSON value
    Known(Value),
    /// Value produced by other nodes (or a secret)
    Deferred(Output<Value>),
}

impl InputValue {
    /// Erase a typed input
    pub fn from_input<T>(input: Input<T>) -> DeclarationResult<Self>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        match input {
            Input::Value(value) => Ok(InputValue::Known(serde_json::to_value(value)?)),
            Input::Output(output) => Ok(Self::from_output(output.into_json())),
        }
    }

    /// Erase an output, collapsing it to `Known` when it has no producers
    ///
    /// Secret values always stay deferred so plans never print them.
    pub fn from_output(output: Output<Value>) -> Self {
        if output.dependencies().is_empty() && !output.is_secret() {
            if let Ok(value) = output.resolve(&ResolvedOutputs::new()) {
                return InputValue::Known(value);
            }
        }
        InputValue::Deferred(output)
    }

    /// Nodes this input waits on
    pub fn dependencies(&self) -> BTreeSet<NodeId> {
        match self {
            InputValue::Known(_) => BTreeSet::new(),
            InputValue::Deferred(output) => output.dependencies().clone(),
        }
    }

    /// Resolve against the engine's state
    pub fn resolve(&self, resolved: &ResolvedOutputs) -> OutputResult<Value> {
        match self {
            InputValue::Known(value) => Ok(value.clone()),
            InputValue::Deferred(output) => output.resolve(resolved),
        }
    }

    /// Whether the input is redacted in plans
    pub fn is_secret(&self) -> bool {
        matches!(self, InputValue::Deferred(output) if output.is_secret())
    }

    /// Known value, if any
    pub fn known(&self) -> Option<&Value> {
        match self {
            InputValue::Known(value) => Some(value),
            InputValue::Deferred(_) => None,
        }
    }
}

/// Named inputs of a resource
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: BTreeMap<String, InputValue>,
}

impl Inputs {
    /// Create an empty input set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed input
    pub fn with<T>(mut self, key: &str, input: impl Into<Input<T>>) -> DeclarationResult<Self>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        self.values
            .insert(key.to_string(), InputValue::from_input(input.into())?);
        Ok(self)
    }

    /// Add an optional typed input; `None` leaves the key unset
    pub fn with_optional<T>(self, key: &str, input: Option<Input<T>>) -> DeclarationResult<Self>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        match input {
            Some(input) => self.with(key, input),
            None => Ok(self),
        }
    }

    /// Add a known JSON value
    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), InputValue::Known(value));
        self
    }

    /// Add an already-composed JSON output
    pub fn with_output(mut self, key: &str, output: Output<Value>) -> Self {
        self.values
            .insert(key.to_string(), InputValue::from_output(output));
        self
    }

    /// Look up an input by key
    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.values.get(key)
    }

    /// Iterate inputs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.values.iter()
    }

    /// Union of all inputs' dependencies
    pub fn dependencies(&self) -> BTreeSet<NodeId> {
        self.values
            .values()
            .flat_map(|input| input.dependencies())
            .collect()
    }

    /// Resolve every input into a JSON object
    pub fn resolve(&self, resolved: &ResolvedOutputs) -> OutputResult<serde_json::Map<String, Value>> {
        self.values
            .iter()
            .map(|(key, input)| Ok((key.clone(), input.resolve(resolved)?)))
            .collect()
    }
}
