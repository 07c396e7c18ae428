// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declaration plans
//!
//! A plan is the frozen result of one declaration pass: every node with its
//! typed inputs, the dependency edges between them, and a creation order
//! that respects every edge. Building a plan is where the graph is checked
//! for cycles and for nodes owned by more than one component.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::context::{Diagnostic, OutputRegistration, StackContext, StackExport};
use crate::errors::DeclarationResult;
use crate::graph::{invariants, DeclarationGraph, NodeId, ResourceNode};
use crate::output::{InputValue, Inputs};

/// Placeholder printed for secret values
pub const SECRET_PLACEHOLDER: &str = "[secret]";

/// Placeholder printed for values known only after apply
pub const COMPUTED_PLACEHOLDER: &str = "[computed]";

/// Ordered, acyclic declaration graph ready for an engine
#[derive(Debug, Clone)]
pub struct DeclarationPlan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub project: String,
    pub stack: String,
    pub graph: DeclarationGraph,
    /// Creation order respecting every dependency edge
    pub order: Vec<NodeId>,
    /// Groups of nodes with no dependencies among each other
    pub waves: Vec<Vec<NodeId>>,
    pub registrations: Vec<OutputRegistration>,
    pub exports: Vec<StackExport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DeclarationPlan {
    /// Freeze a declaration pass
    ///
    /// # Errors
    ///
    /// - [`crate::DeclarationError::DependencyCycle`] naming the nodes of a cycle
    /// - a primitive-creation error naming a node owned by two components
    pub fn from_context(ctx: &StackContext) -> DeclarationResult<Self> {
        let graph = ctx.graph().clone();
        invariants::validate_exclusive_ownership(&graph)?;
        let order = invariants::topological_order(&graph)?;
        let waves = invariants::dependency_waves(&graph)?;

        Ok(Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            project: ctx.config().project.clone(),
            stack: ctx.config().stack.clone(),
            graph,
            order,
            waves,
            registrations: ctx.registrations().to_vec(),
            exports: ctx.exports().to_vec(),
            diagnostics: ctx.diagnostics().to_vec(),
        })
    }

    /// Nodes in creation order
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &ResourceNode> {
        self.order.iter().filter_map(|id| self.graph.get(*id))
    }

    /// Position of a node in the creation order
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|node| *node == id)
    }

    /// Position of a node, looked up by name
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.order
            .iter()
            .position(|id| self.graph.get(*id).map(|node| node.name.as_str()) == Some(name))
    }

    /// Displayable view with secrets redacted
    pub fn view(&self) -> PlanView {
        let resources = self
            .nodes_in_order()
            .map(|node| ResourceView {
                name: node.name.clone(),
                type_token: node.type_token.clone(),
                kind: node.kind.to_string(),
                parent: node.parent.map(|id| self.graph.name_of(id)),
                provider: node.provider.map(|id| self.graph.name_of(id)),
                depends_on: node
                    .dependencies()
                    .into_iter()
                    .map(|id| self.graph.name_of(id))
                    .collect(),
                ignore_changes: node.ignore_changes.clone(),
                inputs: redact(&node.inputs),
            })
            .collect();

        let outputs = self
            .registrations
            .iter()
            .map(|registration| {
                (
                    self.graph.name_of(registration.component),
                    redact(&registration.outputs),
                )
            })
            .collect();

        let exports = self
            .exports
            .iter()
            .map(|export| (export.name.clone(), redact_value(&export.value)))
            .collect();

        PlanView {
            id: self.id,
            created_at: self.created_at,
            project: self.project.clone(),
            stack: self.stack.clone(),
            resources,
            outputs,
            exports,
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Plan as pretty-printed JSON with secrets redacted
    pub fn to_json(&self) -> DeclarationResult<String> {
        Ok(serde_json::to_string_pretty(&self.view())?)
    }
}

/// Serializable view of a plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub project: String,
    pub stack: String,
    pub resources: Vec<ResourceView>,
    pub outputs: BTreeMap<String, Map<String, Value>>,
    pub exports: BTreeMap<String, Value>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Serializable view of one node
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub name: String,
    #[serde(rename = "type")]
    pub type_token: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
    pub inputs: Map<String, Value>,
}

fn redact(inputs: &Inputs) -> Map<String, Value> {
    inputs
        .iter()
        .map(|(key, value)| (key.clone(), redact_value(value)))
        .collect()
}

fn redact_value(value: &InputValue) -> Value {
    match value {
        InputValue::Known(value) => value.clone(),
        InputValue::Deferred(output) if output.is_secret() => json!(SECRET_PLACEHOLDER),
        InputValue::Deferred(_) => json!(COMPUTED_PLACEHOLDER),
    }
}
