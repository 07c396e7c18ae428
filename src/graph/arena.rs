// Copyright (c) 2025 - Cowboy AI, Inc.
//! Arena of declared nodes

use std::collections::BTreeSet;

use super::invariants;
use super::node::{DependencyEdge, NodeId, PrimitiveKind, ResourceNode};
use crate::errors::{DeclarationError, DeclarationResult};
use crate::output::Inputs;

/// Fields of a node about to be declared
#[derive(Debug, Clone)]
pub(crate) struct NewNode {
    pub name: String,
    pub type_token: String,
    pub kind: PrimitiveKind,
    pub parent: Option<NodeId>,
    pub provider: Option<NodeId>,
    pub inputs: Inputs,
    pub depends_on: BTreeSet<NodeId>,
    pub ignore_changes: Vec<String>,
}

/// All nodes declared in one pass, indexed by [`NodeId`]
///
/// Nodes are never removed; a node's id is its declaration index.
#[derive(Debug, Clone, Default)]
pub struct DeclarationGraph {
    nodes: Vec<ResourceNode>,
}

impl DeclarationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node
    ///
    /// Rejects references to unknown nodes, a parent that is not a
    /// component, and a provider that is not a provider. Duplicate names are
    /// left for the engine to reject.
    pub(crate) fn insert(&mut self, node: NewNode) -> DeclarationResult<NodeId> {
        invariants::validate_resource_name(&node.name)?;

        if let Some(parent) = node.parent {
            let owner = self.node(parent)?;
            if !owner.kind.is_component() {
                return Err(DeclarationError::primitive(
                    &node.name,
                    format!("parent {} is a {}, not a component", owner.name, owner.kind),
                ));
            }
        }

        if let Some(provider) = node.provider {
            let handle = self.node(provider)?;
            if !handle.kind.is_provider() {
                return Err(DeclarationError::primitive(
                    &node.name,
                    format!("{} is a {}, not a provider", handle.name, handle.kind),
                ));
            }
        }

        for dependency in node.depends_on.iter().chain(node.inputs.dependencies().iter()) {
            if self.get(*dependency).is_none() {
                return Err(DeclarationError::primitive(
                    &node.name,
                    format!("depends on undeclared node {}", dependency),
                ));
            }
        }

        let id = NodeId::new(self.nodes.len());
        self.nodes.push(ResourceNode {
            id,
            name: node.name,
            type_token: node.type_token,
            kind: node.kind,
            parent: node.parent,
            provider: node.provider,
            inputs: node.inputs,
            depends_on: node.depends_on,
            ignore_changes: node.ignore_changes,
            children: Vec::new(),
        });

        if let Some(parent) = node.parent {
            self.nodes[parent.index()].children.push(id);
        }

        Ok(id)
    }

    /// Add an ordering constraint between two declared nodes
    pub fn add_dependency(&mut self, dependent: NodeId, dependency: NodeId) -> DeclarationResult<()> {
        let dependency_name = self.node(dependency)?.name.clone();
        let node = self.node(dependent)?;
        if dependent == dependency {
            return Err(DeclarationError::DependencyCycle {
                nodes: vec![node.name.clone(), dependency_name],
            });
        }
        self.nodes[dependent.index()].depends_on.insert(dependency);
        Ok(())
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id.index())
    }

    /// Look up a node, failing for unknown ids
    pub fn node(&self, id: NodeId) -> DeclarationResult<&ResourceNode> {
        self.get(id)
            .ok_or_else(|| DeclarationError::configuration(format!("unknown node {}", id)))
    }

    /// Logical name of a node (or its id when unknown)
    pub fn name_of(&self, id: NodeId) -> String {
        self.get(id)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// All nodes in declaration order
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    /// Number of declared nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been declared
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct children of a component
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// All nodes owned (transitively) by a component
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            found.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        found
    }

    /// Find a node by name within a parent scope
    pub fn find(&self, name: &str, parent: Option<NodeId>) -> Option<&ResourceNode> {
        self.nodes
            .iter()
            .find(|node| node.name == name && node.parent == parent)
    }

    /// Nodes of a given kind, in declaration order
    pub fn of_kind(&self, kind: PrimitiveKind) -> Vec<&ResourceNode> {
        self.nodes.iter().filter(|node| node.kind == kind).collect()
    }

    /// Every dependency edge in the graph
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.nodes.iter().flat_map(|node| node.edges()).collect()
    }

    /// Nodes in an order that respects every dependency edge
    pub fn topological_order(&self) -> DeclarationResult<Vec<NodeId>> {
        invariants::topological_order(self)
    }

    /// Groups of nodes that can be resolved concurrently, in order
    pub fn waves(&self) -> DeclarationResult<Vec<Vec<NodeId>>> {
        invariants::dependency_waves(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn new_node(name: &str, kind: PrimitiveKind, parent: Option<NodeId>) -> NewNode {
        NewNode {
            name: name.to_string(),
            type_token: format!("test:index:{}", kind),
            kind,
            parent,
            provider: None,
            inputs: Inputs::new(),
            depends_on: BTreeSet::new(),
            ignore_changes: Vec::new(),
        }
    }

    #[test]
    fn test_children_are_owned_by_component() {
        let mut graph = DeclarationGraph::new();
        let component = graph
            .insert(new_node("hub", PrimitiveKind::Component, None))
            .unwrap();
        let vpc = graph
            .insert(new_node("hub-vpc", PrimitiveKind::Network, Some(component)))
            .unwrap();

        assert_eq!(graph.children(component), &[vpc]);
        assert_eq!(graph.descendants(component), vec![vpc]);
        assert!(graph.find("hub-vpc", Some(component)).is_some());
        assert!(graph.find("hub-vpc", None).is_none());
    }

    #[test]
    fn test_non_component_cannot_own() {
        let mut graph = DeclarationGraph::new();
        let vpc = graph
            .insert(new_node("vpc", PrimitiveKind::Network, None))
            .unwrap();
        let err = graph
            .insert(new_node("subnet", PrimitiveKind::Network, Some(vpc)))
            .unwrap_err();
        assert_eq!(err.resource(), Some("subnet"));
    }

    #[test]
    fn test_provider_must_be_provider_kind() {
        let mut graph = DeclarationGraph::new();
        let vpc = graph
            .insert(new_node("vpc", PrimitiveKind::Network, None))
            .unwrap();
        let mut cluster = new_node("cluster", PrimitiveKind::ManagedCluster, None);
        cluster.provider = Some(vpc);
        assert!(graph.insert(cluster).is_err());
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut graph = DeclarationGraph::new();
        let a = graph
            .insert(new_node("a", PrimitiveKind::AddOn, None))
            .unwrap();
        let err = graph.add_dependency(a, a).unwrap_err();
        assert!(matches!(err, DeclarationError::DependencyCycle { .. }));
    }

    #[test]
    fn test_edges_include_explicit_dependencies() {
        let mut graph = DeclarationGraph::new();
        let base = graph
            .insert(new_node("argocd", PrimitiveKind::AddOn, None))
            .unwrap();
        let mut apps = new_node("argocd-apps", PrimitiveKind::AddOn, None);
        apps.depends_on.insert(base);
        let apps = graph.insert(apps).unwrap();

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].dependent, apps);
        assert_eq!(edges[0].dependency, base);
    }
}
