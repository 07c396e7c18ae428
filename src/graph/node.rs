// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource nodes and dependency edges

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::output::Inputs;

/// Arena index of a declared node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in declaration order
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Taxonomy of declarable resources
///
/// Provider-specific SDK types all map onto one of these kinds; the kind
/// decides how failures are classified and which outputs the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Composite that owns other nodes
    Component,
    /// Configured cloud or cluster-API backend
    Provider,
    /// Virtual network (VPC)
    Network,
    /// Resource container (Azure resource group)
    ResourceGroup,
    /// Managed Kubernetes control plane (EKS, AKS)
    ManagedCluster,
    /// Service identity (service account)
    Identity,
    /// Credential bound to an identity (token secret)
    Credential,
    /// Cluster-scoped permission set (cluster role)
    PermissionRole,
    /// Binding of a permission set to an identity
    PermissionBinding,
    /// Control-plane add-on installation (Helm release)
    AddOn,
    /// Entry in a hub's cluster registry
    RegistryEntry,
}

impl PrimitiveKind {
    /// Canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Provider => "provider",
            Self::Network => "network",
            Self::ResourceGroup => "resource_group",
            Self::ManagedCluster => "managed_cluster",
            Self::Identity => "identity",
            Self::Credential => "credential",
            Self::PermissionRole => "permission_role",
            Self::PermissionBinding => "permission_binding",
            Self::AddOn => "add_on",
            Self::RegistryEntry => "registry_entry",
        }
    }

    /// Whether nodes of this kind may own children
    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component)
    }

    /// Whether nodes of this kind may be referenced as a provider
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named infrastructure declaration
#[derive(Debug, Clone)]
pub struct ResourceNode {
    /// Arena index
    pub id: NodeId,
    /// Logical name, unique within the parent scope
    pub name: String,
    /// Engine type token (e.g. `eks:index:Cluster`)
    pub type_token: String,
    /// Primitive kind
    pub kind: PrimitiveKind,
    /// Owning component
    pub parent: Option<NodeId>,
    /// Provider the resource is created through
    pub provider: Option<NodeId>,
    /// Typed configuration inputs
    pub inputs: Inputs,
    /// Explicit ordering constraints
    pub depends_on: BTreeSet<NodeId>,
    /// Input properties the engine must not diff
    pub ignore_changes: Vec<String>,
    /// Owned nodes (components only)
    pub children: Vec<NodeId>,
}

/// Why one node must be created after another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Declared via `depends_on`
    Explicit,
    /// Implied by consuming another node's output
    Input,
    /// Implied by creating the node through a provider
    Provider,
}

/// Ordering constraint: `dependent` is created after `dependency`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Node that waits
    pub dependent: NodeId,
    /// Node waited on
    pub dependency: NodeId,
    /// Source of the constraint
    pub kind: EdgeKind,
}

impl ResourceNode {
    /// Every edge leaving this node, explicit and implied
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .depends_on
            .iter()
            .map(|&dependency| DependencyEdge {
                dependent: self.id,
                dependency,
                kind: EdgeKind::Explicit,
            })
            .collect();

        edges.extend(self.inputs.dependencies().into_iter().map(|dependency| {
            DependencyEdge {
                dependent: self.id,
                dependency,
                kind: EdgeKind::Input,
            }
        }));

        if let Some(provider) = self.provider {
            edges.push(DependencyEdge {
                dependent: self.id,
                dependency: provider,
                kind: EdgeKind::Provider,
            });
        }

        edges
    }

    /// Distinct nodes this node waits on
    pub fn dependencies(&self) -> BTreeSet<NodeId> {
        self.edges().into_iter().map(|edge| edge.dependency).collect()
    }
}
